use once_cell::sync::Lazy;
use regex::Regex;

use super::{NormalizedLine, Speaker};

/// `[<n>[.)]] <label> (:|.) <content>`, label matched case-insensitively.
static EXPLICIT_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([0-9]+[.)]?)?\s*(male|nam|female|nữ|nu)\s*[:.]\s*(.+)$")
        .expect("explicit label pattern is valid")
});

/// `<n>[.):] <content>`: a speaker alias when the separator is `:`,
/// otherwise a spoken list number.
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)([.):]?)\s+(.+)$").expect("numeric prefix pattern is valid")
});

/// Rules tried against each non-blank line, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// `Male:`, `Nam.`, `2) Female: ...` and friends.
    ExplicitLabel,
    /// `1: ...` (speaker alias) or `1. ...` (list item read aloud).
    NumericPrefix,
    /// Any line without a colon is read by the male voice.
    Unlabeled,
}

const RULES: [MatchRule; 3] = [
    MatchRule::ExplicitLabel,
    MatchRule::NumericPrefix,
    MatchRule::Unlabeled,
];

impl MatchRule {
    /// Try this rule against an already-trimmed, non-empty line.
    pub fn apply(self, line: &str) -> Option<NormalizedLine> {
        match self {
            MatchRule::ExplicitLabel => {
                let caps = EXPLICIT_LABEL.captures(line)?;
                let speaker = label_speaker(&caps[2]);
                let content = match caps.get(1) {
                    Some(marker) => format!("{} {}", marker.as_str(), &caps[3]),
                    None => caps[3].to_string(),
                };
                Some(NormalizedLine::new(speaker, content))
            }
            MatchRule::NumericPrefix => {
                let caps = NUMERIC_PREFIX.captures(line)?;
                let number = &caps[1];
                let separator = &caps[2];
                let rest = &caps[3];
                if separator == ":" {
                    let speaker = if number == "2" {
                        Speaker::Female
                    } else {
                        Speaker::Male
                    };
                    Some(NormalizedLine::new(speaker, rest))
                } else {
                    Some(NormalizedLine::new(
                        Speaker::Male,
                        format!("{number}{separator} {rest}"),
                    ))
                }
            }
            MatchRule::Unlabeled => {
                (!line.contains(':')).then(|| NormalizedLine::new(Speaker::Male, line))
            }
        }
    }
}

fn label_speaker(label: &str) -> Speaker {
    match label.to_lowercase().as_str() {
        "female" | "nữ" | "nu" => Speaker::Female,
        _ => Speaker::Male,
    }
}

/// One input line after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    /// Whitespace-only line, kept verbatim so line numbers stay aligned.
    Blank(String),
    Spoken { rule: MatchRule, line: NormalizedLine },
    /// Contains a colon but no recognised label; passed through untouched.
    Verbatim(String),
}

impl ScriptLine {
    /// Text of the line as it appears in the normalized script.
    pub fn render(&self) -> String {
        match self {
            ScriptLine::Blank(raw) | ScriptLine::Verbatim(raw) => raw.clone(),
            ScriptLine::Spoken { line, .. } => line.render(),
        }
    }

    /// Resolved speaker and content, for spoken lines.
    pub fn normalized(&self) -> Option<&NormalizedLine> {
        match self {
            ScriptLine::Spoken { line, .. } => Some(line),
            _ => None,
        }
    }
}

/// Classify a single raw line.
pub fn classify(raw: &str) -> ScriptLine {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ScriptLine::Blank(raw.to_string());
    }

    RULES
        .iter()
        .find_map(|&rule| {
            rule.apply(trimmed)
                .map(|line| ScriptLine::Spoken { rule, line })
        })
        .unwrap_or_else(|| ScriptLine::Verbatim(raw.to_string()))
}

/// Rewrite every recognisable line of `script` into `Speaker: content` form.
///
/// The output has exactly as many lines as the input.
pub fn normalize_script(script: &str) -> String {
    script
        .split('\n')
        .map(|raw| classify(raw).render())
        .collect::<Vec<_>>()
        .join("\n")
}
