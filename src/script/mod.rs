//! Script handling: speaker normalization, speaker assignment and the
//! karaoke timing estimate.

pub mod assign;
pub mod normalize;
pub mod timing;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use assign::{assign_speakers, SpeakerPattern};
pub use normalize::{classify, normalize_script, MatchRule, ScriptLine};
pub use timing::{active_line, estimate_timings, format_clock, ScriptTiming};

/// The two voices a dialogue is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    Male,
    Female,
}

impl Speaker {
    /// Canonical label text.
    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::Male => "Male",
            Speaker::Female => "Female",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script line with its speaker label resolved.
///
/// `content` never starts with a speaker label of its own; the canonical
/// label is applied by [`NormalizedLine::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine {
    pub speaker: Speaker,
    pub content: String,
}

impl NormalizedLine {
    /// Line for `speaker` with the given content.
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
        }
    }

    /// Canonical `Speaker: content` form.
    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker, self.content)
    }
}
