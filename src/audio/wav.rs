use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::PcmAsset;

/// Length of the canonical RIFF/WAVE header written by [`encode_pcm16`] and
/// [`encode_samples`].
pub const HEADER_LEN: usize = 44;

/// Bytes per mono 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Scale applied to negative samples, and the divisor used when decoding.
const NEGATIVE_SCALE: f64 = 32768.0;
/// Scale applied to non-negative samples.
const POSITIVE_SCALE: f64 = 32767.0;

/// Failure building or reading a WAVE container.
#[derive(thiserror::Error, Debug)]
pub enum WavError {
    #[error("WAV container error: {0}")]
    Container(#[from] hound::Error),
    #[error("PCM payload must hold whole 16-bit samples, got {0} bytes")]
    OddLength(usize),
    #[error("Unsupported WAV layout: {0}")]
    Unsupported(String),
}

fn mono_pcm16_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Quantize a float sample to a signed 16-bit integer.
///
/// The sample is clamped to `[-1, 1]`, then scaled asymmetrically
/// (`× 32768` below zero, `× 32767` otherwise) and truncated toward zero.
/// The product is taken in `f64`, where it is exact, so no rounding happens
/// before the truncation. The lossy encoders reuse this so both download
/// formats carry identical integer samples.
pub fn quantize(sample: f32) -> i16 {
    let s = f64::from(sample.clamp(-1.0, 1.0));
    if s < 0.0 {
        (s * NEGATIVE_SCALE) as i16
    } else {
        (s * POSITIVE_SCALE) as i16
    }
}

/// Reinterpret little-endian 16-bit PCM bytes as integer samples.
pub fn pcm16_samples(pcm: &[u8]) -> Result<Vec<i16>, WavError> {
    if pcm.len() % BYTES_PER_SAMPLE != 0 {
        return Err(WavError::OddLength(pcm.len()));
    }
    Ok(pcm
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

fn write_container<I>(samples: I, sample_rate: u32) -> Result<Vec<u8>, WavError>
where
    I: ExactSizeIterator<Item = i16>,
{
    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN + samples.len() * BYTES_PER_SAMPLE));
    {
        let mut writer = WavWriter::new(&mut cursor, mono_pcm16_spec(sample_rate))?;
        for sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Wrap already-quantized little-endian 16-bit PCM in a WAVE container.
///
/// The payload is copied verbatim, so decoding the result yields exactly
/// the original integer samples.
pub fn encode_pcm16(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    let samples = pcm16_samples(pcm)?;
    write_container(samples.into_iter(), sample_rate)
}

/// Quantize float samples (see [`quantize`]) and wrap them in a WAVE container.
pub fn encode_samples(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    write_container(samples.iter().map(|&s| quantize(s)), sample_rate)
}

/// Decode a mono 16-bit PCM WAVE container.
///
/// Integer samples are mapped to floats as `value / 32768`. Containers that
/// are not mono 16-bit integer PCM are rejected, as are buffers whose data
/// chunk is shorter than its header claims.
pub fn decode(container: &[u8]) -> Result<PcmAsset, WavError> {
    let reader = WavReader::new(Cursor::new(container))?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(WavError::Unsupported(format!(
            "expected 16-bit integer PCM, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    if spec.channels != 1 {
        return Err(WavError::Unsupported(format!(
            "expected mono, got {} channels",
            spec.channels
        )));
    }
    if spec.sample_rate == 0 {
        return Err(WavError::Unsupported("sample rate is zero".to_string()));
    }

    let samples = reader
        .into_samples::<i16>()
        .map(|s| s.map(|v| (f64::from(v) / NEGATIVE_SCALE) as f32))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PcmAsset::new(samples, spec.sample_rate))
}
