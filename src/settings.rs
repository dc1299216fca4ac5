//! Voice configuration and the instruction-annotated synthesis request.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::script::Speaker;
use crate::{SpeakerVoice, SpeechRequest};

/// Voices offered for the male role.
pub const MALE_VOICES: [&str; 4] = ["Puck", "Charon", "Fenrir", "Child Male"];
/// Voices offered for the female role.
pub const FEMALE_VOICES: [&str; 3] = ["Kore", "Zephyr", "Child Female"];

const EMPHASIS_INSTRUCTION: &str = "emphasizing words wrapped in *asterisks*";

const CHILD_MALE_INSTRUCTION: &str = "Generate clear, natural English speech in a CHILD BOY voice. \
Style: cheerful, curious; pace slightly slower; pitch slightly higher. Accent: American English (en-US). \
Keep pronunciation suitable for kids learning English.";

const CHILD_FEMALE_INSTRUCTION: &str = "Generate clear, natural English speech in a CHILD GIRL voice. \
Style: friendly, encouraging; pace slightly slower; pitch moderately higher. Accent: American English (en-US). \
Keep pronunciation suitable for kids learning English.";

macro_rules! nine_step_scale {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every step, lowest first.
            pub const ALL: [Self; 9] = [$(Self::$variant),+];

            /// Label used in the synthesis instruction.
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Slider position, 0 (lowest) to 8 (highest).
            pub fn step(self) -> usize {
                Self::ALL.iter().position(|&v| v == self).unwrap_or(4)
            }

            /// Value at slider position `step`, if in range.
            pub fn from_step(step: usize) -> Option<Self> {
                Self::ALL.get(step).copied()
            }

            /// True for the middle step.
            pub fn is_normal(self) -> bool {
                self.step() == 4
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[4]
            }
        }
    };
}

nine_step_scale!(
    /// How fast the synthesized voices should speak.
    SpeakingRate {
        VerySlow => "Very Slow",
        Slow => "Slow",
        ModeratelySlow => "Moderately Slow",
        SlightlySlow => "Slightly Slow",
        Normal => "Normal",
        SlightlyFast => "Slightly Fast",
        ModeratelyFast => "Moderately Fast",
        Fast => "Fast",
        VeryFast => "Very Fast",
    }
);

nine_step_scale!(
    /// Requested voice pitch.
    Pitch {
        VeryDeep => "Very Deep",
        Deep => "Deep",
        ModeratelyDeep => "Moderately Deep",
        SlightlyDeep => "Slightly Deep",
        Normal => "Normal",
        SlightlyHigh => "Slightly High",
        ModeratelyHigh => "Moderately High",
        High => "High",
        VeryHigh => "Very High",
    }
);

/// User-facing voice settings for a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
#[serde(default, rename_all = "camelCase")]
pub struct VoiceSettings {
    pub speed: SpeakingRate,
    pub pitch: Pitch,
    pub male_voice: String,
    pub female_voice: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            speed: SpeakingRate::Normal,
            pitch: Pitch::Normal,
            male_voice: "Fenrir".to_string(),
            female_voice: "Kore".to_string(),
        }
    }
}

impl VoiceSettings {
    /// Start a builder seeded with the defaults.
    pub fn builder() -> VoiceSettingsBuilder {
        VoiceSettingsBuilder::default()
    }

    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A catalogue voice mapped onto a synthesis voice id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoice {
    pub voice_id: String,
    /// Persona instruction required to make the voice sound as advertised.
    pub instruction: Option<&'static str>,
}

/// Map a catalogue voice name to the id the synthesizer understands.
///
/// The child personas are regular voices steered by an extra instruction;
/// every other name is passed through as-is.
pub fn resolve_voice(name: &str) -> ResolvedVoice {
    match name {
        "Child Male" => ResolvedVoice {
            voice_id: "Puck".to_string(),
            instruction: Some(CHILD_MALE_INSTRUCTION),
        },
        "Child Female" => ResolvedVoice {
            voice_id: "Zephyr".to_string(),
            instruction: Some(CHILD_FEMALE_INSTRUCTION),
        },
        other => ResolvedVoice {
            voice_id: other.to_string(),
            instruction: None,
        },
    }
}

/// Build the synthesis request for an already-normalized script.
///
/// The script is prefixed with a `[System Note: ...]` line listing the
/// speed, pitch and persona hints; the emphasis hint is always present.
pub fn compose_request(settings: &VoiceSettings, normalized_script: &str) -> SpeechRequest {
    let male = resolve_voice(&settings.male_voice);
    let female = resolve_voice(&settings.female_voice);

    let mut instructions: Vec<String> = Vec::new();
    if !settings.speed.is_normal() {
        instructions.push(format!("speaking with {} speed", settings.speed.label()));
    }
    if !settings.pitch.is_normal() {
        instructions.push(format!("speaking with {} pitch", settings.pitch.label()));
    }
    instructions.extend(male.instruction.map(str::to_string));
    instructions.extend(female.instruction.map(str::to_string));
    instructions.push(EMPHASIS_INSTRUCTION.to_string());

    let text = format!(
        "[System Note: Read the following dialogue {}.]\n{}",
        instructions.join(", "),
        normalized_script
    );

    SpeechRequest {
        text,
        voices: vec![
            SpeakerVoice {
                speaker: Speaker::Male,
                voice_id: male.voice_id,
            },
            SpeakerVoice {
                speaker: Speaker::Female,
                voice_id: female.voice_id,
            },
        ],
    }
}
