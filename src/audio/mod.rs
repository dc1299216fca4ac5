//! Audio post-processing: silence trimming, WAV containers, rate rendering
//! and the lossy download encoder seam.

pub mod lossy;
pub mod rate;
pub mod trim;
pub mod wav;

use std::path::Path;

pub use lossy::{encode_lossy, FrameSink, LossyEncoder, FRAME_SAMPLES};
pub use rate::{render_at_rate, MAX_RATE, MIN_RATE};
pub use trim::{trim_trailing_silence, TRIM_PADDING_BYTES};
pub use wav::WavError;

/// Sample rate of the PCM returned by the speech synthesis capability.
pub const SAMPLE_RATE: u32 = 24000;

/// Decoded mono audio.
///
/// Samples are floats in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAsset {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmAsset {
    /// Wrap mono `samples` recorded at `sample_rate`.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Always 1; stereo is never produced or accepted.
    pub fn channel_count(&self) -> u16 {
        1
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encode as a 16-bit PCM WAVE container.
    pub fn to_wav(&self) -> Result<Vec<u8>, WavError> {
        wav::encode_samples(&self.samples, self.sample_rate)
    }

    /// Write the audio to a 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_wav()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_samples_over_rate() {
        let asset = PcmAsset::new(vec![0.0; 36000], 24000);
        assert!((asset.duration_secs() - 1.5).abs() < 1e-12);
        assert_eq!(asset.channel_count(), 1);
    }

    #[test]
    fn writes_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let asset = PcmAsset::new(vec![0.0, -0.5, 0.25], 24000);
        asset.write_wav(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let decoded = wav::decode(&bytes).unwrap();
        assert_eq!(decoded.samples, vec![0.0, -0.5, 8191.0 / 32768.0]);
    }
}
