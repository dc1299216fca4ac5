use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::{CapabilityError, SpeechRequest, SpeechSynthesizer, SynthesizedSpeech};

/// Failure loading a clip.
#[derive(thiserror::Error, Debug)]
pub enum PrerecordedError {
    #[error("Failed to read clip: {0}")]
    Wav(#[from] hound::Error),
    #[error("Clip must be mono 16-bit PCM, got {channels} channel(s) of {bits}-bit {format:?}")]
    Format {
        channels: u16,
        bits: u16,
        format: SampleFormat,
    },
}

/// Synthesizer that answers every request with the same recorded clip.
///
/// Useful for demos and for exercising the pipeline without a speech
/// service. Requests are kept so callers can inspect what would have been
/// sent.
#[derive(Debug, Clone, Default)]
pub struct PrerecordedSpeech {
    pcm: Vec<u8>,
    sample_rate: u32,
    requests: Vec<SpeechRequest>,
}

impl PrerecordedSpeech {
    /// Replay raw mono 16-bit little-endian PCM.
    pub fn from_pcm(pcm: Vec<u8>, sample_rate: u32) -> Self {
        Self {
            pcm,
            sample_rate,
            requests: Vec::new(),
        }
    }

    /// Replay the samples of a mono 16-bit WAV file.
    pub fn from_wav(path: &Path) -> Result<Self, PrerecordedError> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();
        if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int
        {
            return Err(PrerecordedError::Format {
                channels: spec.channels,
                bits: spec.bits_per_sample,
                format: spec.sample_format,
            });
        }

        let mut pcm = Vec::with_capacity(reader.len() as usize * 2);
        for sample in reader.into_samples::<i16>() {
            pcm.extend_from_slice(&sample?.to_le_bytes());
        }
        log::info!(
            "Loaded {} samples at {} Hz from {}",
            pcm.len() / 2,
            spec.sample_rate,
            path.display()
        );
        Ok(Self::from_pcm(pcm, spec.sample_rate))
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> &[SpeechRequest] {
        &self.requests
    }
}

impl SpeechSynthesizer for PrerecordedSpeech {
    fn synthesize(&mut self, request: &SpeechRequest) -> Result<SynthesizedSpeech, CapabilityError> {
        log::debug!("Replaying clip for {} chars of script", request.text.len());
        self.requests.push(request.clone());
        Ok(SynthesizedSpeech {
            pcm: self.pcm.clone(),
            sample_rate: self.sample_rate,
        })
    }
}
