use serde::{Deserialize, Serialize};

use super::Speaker;

/// Bulk relabelling applied to a whole script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeakerPattern {
    Male,
    Female,
    /// Male on even lines, Female on odd lines.
    MaleFemale,
    FemaleMale,
}

impl SpeakerPattern {
    fn speaker_for(self, index: usize) -> Speaker {
        let even = index % 2 == 0;
        match self {
            SpeakerPattern::Male => Speaker::Male,
            SpeakerPattern::Female => Speaker::Female,
            SpeakerPattern::MaleFemale if even => Speaker::Male,
            SpeakerPattern::MaleFemale => Speaker::Female,
            SpeakerPattern::FemaleMale if even => Speaker::Female,
            SpeakerPattern::FemaleMale => Speaker::Male,
        }
    }
}

/// Replace every line's speaker label according to `pattern`.
///
/// Anything up to and including a line's first colon is treated as the old
/// label and dropped. Blank lines are emptied but still count toward the
/// alternation index.
pub fn assign_speakers(script: &str, pattern: SpeakerPattern) -> String {
    script
        .split('\n')
        .enumerate()
        .map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return String::new();
            }
            let content = trimmed
                .split_once(':')
                .map(|(_, rest)| rest.trim_start())
                .unwrap_or(trimmed);
            format!("{}: {}", pattern.speaker_for(index), content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternates_by_line_index() {
        let script = "Male: one\nMale: two\n\nthree";
        assert_eq!(
            assign_speakers(script, SpeakerPattern::FemaleMale),
            "Female: one\nMale: two\n\nMale: three"
        );
        assert_eq!(
            assign_speakers(script, SpeakerPattern::MaleFemale),
            "Male: one\nFemale: two\n\nFemale: three"
        );
    }

    #[test]
    fn single_speaker_relabels_everything() {
        assert_eq!(
            assign_speakers("1. Nam: Xin chào\nhello", SpeakerPattern::Female),
            "Female: Xin chào\nFemale: hello"
        );
        assert_eq!(
            assign_speakers("Female:   spaced", SpeakerPattern::Male),
            "Male: spaced"
        );
    }

    #[test]
    fn blank_lines_are_emptied() {
        assert_eq!(assign_speakers("  \nA: b", SpeakerPattern::Male), "\nMale: b");
    }
}
