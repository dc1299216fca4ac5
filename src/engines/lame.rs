//! MP3 downloads through LAME.

use mp3lame_encoder::{Bitrate, Builder, Encoder, FlushNoGap, MonoPcm, Quality};

use crate::audio::lossy::{EncoderError, FrameSink, LossyEncoder};

/// Constant-bitrate mono MP3 encoder.
pub struct LameEncoder {
    pub bitrate: Bitrate,
    pub quality: Quality,
}

impl Default for LameEncoder {
    fn default() -> Self {
        Self {
            bitrate: Bitrate::Kbps128,
            quality: Quality::Good,
        }
    }
}

fn lame_error(context: &str, e: impl std::fmt::Debug) -> EncoderError {
    format!("LAME {context}: {e:?}").into()
}

struct LameSink {
    encoder: Encoder,
}

impl LossyEncoder for LameEncoder {
    fn extension(&self) -> &str {
        "mp3"
    }

    fn open(&self, sample_rate: u32) -> Result<Box<dyn FrameSink>, EncoderError> {
        let mut builder = Builder::new().ok_or("LAME could not allocate an encoder")?;
        builder
            .set_num_channels(1)
            .map_err(|e| lame_error("channels", e))?;
        builder
            .set_sample_rate(sample_rate)
            .map_err(|e| lame_error("sample rate", e))?;
        builder
            .set_brate(self.bitrate)
            .map_err(|e| lame_error("bitrate", e))?;
        builder
            .set_quality(self.quality)
            .map_err(|e| lame_error("quality", e))?;
        let encoder = builder.build().map_err(|e| lame_error("init", e))?;

        log::debug!("Opened LAME encoder at {sample_rate} Hz");
        Ok(Box::new(LameSink { encoder }))
    }
}

impl FrameSink for LameSink {
    fn encode_frame(&mut self, frame: &[i16]) -> Result<Vec<u8>, EncoderError> {
        let mut out = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(frame.len()));
        self.encoder
            .encode_to_vec(MonoPcm(frame), &mut out)
            .map_err(|e| lame_error("encode", e))?;
        Ok(out)
    }

    fn flush(mut self: Box<Self>) -> Result<Vec<u8>, EncoderError> {
        let mut out = Vec::with_capacity(7200);
        self.encoder
            .flush_to_vec::<FlushNoGap>(&mut out)
            .map_err(|e| lame_error("flush", e))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::lossy::encode_lossy;

    #[test]
    fn encodes_a_second_of_tone() {
        let samples: Vec<f32> = (0..24000)
            .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / 24000.0).sin() * 0.3)
            .collect();
        let bytes = encode_lossy(&LameEncoder::default(), &samples, 24000).unwrap();
        assert!(!bytes.is_empty());
        // Every MP3 frame starts with an 11-bit sync word.
        assert_eq!(bytes[0], 0xff);
        assert_eq!(bytes[1] & 0xe0, 0xe0);
    }
}
