//! Drafting scripts with an external language model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{CapabilityError, ScriptWriter};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(xml|json|text)?").expect("code fence pattern is valid"));

/// Failure while drafting a script.
#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("Topic must not be empty")]
    EmptyTopic,
    #[error("Script generation failed: {0}")]
    Network(#[source] CapabilityError),
}

/// Whether the script has two speakers or one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScriptMode {
    #[default]
    Dialogue,
    Monologue,
}

/// Target script length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScriptLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ScriptLength {
    fn hint(self) -> &'static str {
        match self {
            ScriptLength::Short => "approx 4-6 lines",
            ScriptLength::Medium => "approx 12-16 lines",
            ScriptLength::Long => "approx 25-30 lines",
        }
    }
}

/// What kind of script to ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    pub mode: ScriptMode,
    pub length: ScriptLength,
    pub language: String,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            mode: ScriptMode::Dialogue,
            length: ScriptLength::Medium,
            language: "English".to_string(),
        }
    }
}

/// Build the writer prompt for `topic`.
pub fn build_prompt(topic: &str, options: &ScriptOptions) -> String {
    let mode = match options.mode {
        ScriptMode::Monologue => {
            "Create a monologue script or narrative spoken by a single speaker. \
             Use \"Male:\" or \"Female:\" for the speaker label throughout the text."
        }
        ScriptMode::Dialogue => "Create a natural dialogue between two people.",
    };
    let language = if options.language == "English" {
        "Write in English.".to_string()
    } else {
        format!("Write the content primarily in {}.", options.language)
    };

    format!(
        "You are a professional creative writer and scriptwriter with a deep understanding of \
diverse world views, social topics, and daily life nuances.

Task: Write a script about: \"{topic}\".

Configuration:
- Mode: {mode}
- Length: {length}
- Language: {language}

IMPORTANT FORMATTING RULES:
1. Use STRICTLY the format: \"Male: [text]\" or \"Female: [text]\".
2. Do NOT add any introduction, title, scene descriptions, or conclusion. Just the dialogue lines.
3. Do NOT use Markdown code blocks (no ```).
4. Ensure the content is engaging, culturally relevant, and suitable for the topic.",
        length = options.length.hint(),
    )
}

/// Strip markdown code fences the writer added despite being told not to.
pub fn clean_reply(reply: &str) -> String {
    CODE_FENCE.replace_all(reply, "").trim().to_string()
}

/// Ask `writer` for a script about `topic`.
pub fn generate_script(
    writer: &mut dyn ScriptWriter,
    topic: &str,
    options: &ScriptOptions,
) -> Result<String, ScriptError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ScriptError::EmptyTopic);
    }

    let prompt = build_prompt(topic, options);
    log::debug!(
        "Requesting {:?} {:?} script in {}",
        options.length,
        options.mode,
        options.language
    );
    let reply = writer.write_script(&prompt).map_err(ScriptError::Network)?;
    let script = clean_reply(&reply);
    log::info!("Received script with {} lines", script.lines().count());
    Ok(script)
}
