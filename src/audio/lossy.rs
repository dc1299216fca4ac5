//! Seam for compressed download encoders.
//!
//! The pipeline never depends on a particular codec: anything implementing
//! [`LossyEncoder`] can be plugged in. When no encoder is configured, or the
//! encoder fails, the WAV container is offered for download instead.

use super::wav::quantize;

/// Samples submitted to a [`FrameSink`] per call (one MPEG-1 Layer III frame).
pub const FRAME_SAMPLES: usize = 1152;

/// Error reported by a lossy codec.
pub type EncoderError = Box<dyn std::error::Error + Send + Sync>;

/// A compressed-audio codec that can be opened for one mono stream.
pub trait LossyEncoder: Send + Sync {
    /// File extension for the encoded output, without the dot (e.g. `"mp3"`).
    fn extension(&self) -> &str;

    /// Start a new encoding session for mono audio at `sample_rate`.
    fn open(&self, sample_rate: u32) -> Result<Box<dyn FrameSink>, EncoderError>;
}

/// An open encoding session.
pub trait FrameSink {
    /// Encode up to [`FRAME_SAMPLES`] samples, returning whatever bytes the
    /// codec emitted (possibly none).
    fn encode_frame(&mut self, frame: &[i16]) -> Result<Vec<u8>, EncoderError>;

    /// Drain internal codec state.
    fn flush(self: Box<Self>) -> Result<Vec<u8>, EncoderError>;
}

/// Quantize `samples` and run them through `encoder` frame by frame.
///
/// Samples use the same clamp-and-scale rule as the WAV writer. Emitted chunks
/// are concatenated in order, followed by the flush output.
pub fn encode_lossy(
    encoder: &dyn LossyEncoder,
    samples: &[f32],
    sample_rate: u32,
) -> Result<Vec<u8>, EncoderError> {
    let pcm: Vec<i16> = samples.iter().map(|&s| quantize(s)).collect();
    let mut sink = encoder.open(sample_rate)?;

    let mut out = Vec::new();
    for frame in pcm.chunks(FRAME_SAMPLES) {
        out.extend(sink.encode_frame(frame)?);
    }
    out.extend(sink.flush()?);
    Ok(out)
}
