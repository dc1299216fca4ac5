//! # dialogue-voice
//!
//! Post-processing for synthesized multi-speaker dialogue: turn a loosely
//! formatted script into speaker-tagged lines, run it through a speech
//! synthesizer, and produce playback/download assets with karaoke timing and
//! alternate playback rates.
//!
//! ## Features
//!
//! - **Script normalization**: `Male:`/`Nam:`/`Female:`/`Nữ:` labels, `1:`/`2:`
//!   aliases and spoken list numbers
//! - **Karaoke sync**: per-line time windows estimated from text weight
//! - **WAV codec**: canonical 44-byte mono 16-bit containers
//! - **Rate rendering**: 0.5x to 2.0x playback with matching downloads
//! - **Pluggable lossy downloads**: enable the `mp3` feature for LAME encoding
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use dialogue_voice::{AssetStore, GenerationPipeline, Session, VoiceSettings};
//!
//! let (session, playback) = Session::new(Arc::new(AssetStore::new()));
//! let mut pipeline = GenerationPipeline::new(my_synthesizer);
//!
//! session.generate(&mut pipeline, "1: Hello!\n2: Hi there!", &VoiceSettings::default())?;
//! session.change_rate(&mut pipeline, 1.5)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod engines;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod script;
pub mod settings;

pub use audio::PcmAsset;
pub use error::PipelineError;
pub use pipeline::{
    AssetHandle, AssetStore, AudioSource, GenerationPipeline, GenerationResult, PipelineParams,
    PipelineStage, PlaybackCommand, Rendition, Session,
};
pub use script::{NormalizedLine, ScriptTiming, Speaker};
pub use settings::VoiceSettings;

/// Error type returned by external capabilities (synthesizers, writers).
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

/// Voice assigned to one of the two speaker roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerVoice {
    pub speaker: Speaker,
    pub voice_id: String,
}

/// Everything a synthesizer needs to voice a dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    /// Instruction line followed by the normalized `Speaker: content` script.
    pub text: String,
    pub voices: Vec<SpeakerVoice>,
}

impl SpeechRequest {
    /// Voice id assigned to `speaker`, if any.
    pub fn voice_for(&self, speaker: Speaker) -> Option<&str> {
        self.voices
            .iter()
            .find(|v| v.speaker == speaker)
            .map(|v| v.voice_id.as_str())
    }
}

/// Raw output of a synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedSpeech {
    /// Mono 16-bit little-endian PCM. Empty means the synthesizer produced
    /// no audio.
    pub pcm: Vec<u8>,
    /// Sample rate of `pcm` (24000 for the production synthesizer).
    pub sample_rate: u32,
}

/// Common interface for multi-speaker speech synthesis backends.
pub trait SpeechSynthesizer {
    /// Voice `request.text`, reading `Male:` and `Female:` lines with the
    /// matching voices from `request.voices`.
    fn synthesize(&mut self, request: &SpeechRequest) -> Result<SynthesizedSpeech, CapabilityError>;
}

impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Box<T> {
    fn synthesize(&mut self, request: &SpeechRequest) -> Result<SynthesizedSpeech, CapabilityError> {
        (**self).synthesize(request)
    }
}

/// Interface for language models that draft scripts.
pub trait ScriptWriter {
    /// Answer `prompt` with plain text.
    fn write_script(&mut self, prompt: &str) -> Result<String, CapabilityError>;
}
