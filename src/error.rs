use crate::audio::rate::InvalidRate;
use crate::audio::WavError;
use crate::pipeline::PipelineStage;
use crate::CapabilityError;

/// Fatal failure of a generation or rate-change run.
///
/// Non-fatal conditions (a missing or failing lossy encoder, a script with no
/// tagged lines) never surface here; they only change which assets a result
/// exposes.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Script is empty")]
    EmptyScript,
    #[error("Speech synthesis returned no audio")]
    SynthesisUnavailable,
    #[error("Speech synthesis request failed: {0}")]
    NetworkFailure(#[source] CapabilityError),
    #[error("Could not build the playback container: {0}")]
    EncodeFailure(#[source] WavError),
    #[error("Could not decode the playback container: {0}")]
    DecodeFailure(#[source] WavError),
    #[error(transparent)]
    InvalidRate(#[from] InvalidRate),
}

impl PipelineError {
    /// Stage that was running when this error stopped the pipeline.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::EmptyScript => PipelineStage::Normalizing,
            PipelineError::SynthesisUnavailable | PipelineError::NetworkFailure(_) => {
                PipelineStage::AwaitingSynthesis
            }
            PipelineError::EncodeFailure(_) => PipelineStage::Encoding,
            PipelineError::DecodeFailure(_) => PipelineStage::Decoding,
            PipelineError::InvalidRate(_) => PipelineStage::Rendering,
        }
    }
}
