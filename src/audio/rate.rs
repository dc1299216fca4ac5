use super::PcmAsset;

/// Slowest supported playback rate.
pub const MIN_RATE: f32 = 0.5;
/// Fastest supported playback rate.
pub const MAX_RATE: f32 = 2.0;

/// A playback rate outside the supported range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("Playback rate {0} is outside the supported range 0.5..=2.0")]
pub struct InvalidRate(pub f32);

/// Check that `rate` is a finite factor within `MIN_RATE..=MAX_RATE`.
pub fn validate_rate(rate: f32) -> Result<f32, InvalidRate> {
    if (MIN_RATE..=MAX_RATE).contains(&rate) {
        Ok(rate)
    } else {
        Err(InvalidRate(rate))
    }
}

/// Render `source` as if it were played back `rate` times faster.
///
/// This is plain rate conversion: tempo and pitch change together. The output
/// keeps the source sample rate and holds `floor(len / rate)` samples; output
/// sample `n` reads the source at position `n * rate`, linearly interpolating
/// between neighbours and reading silence past the final sample.
pub fn render_at_rate(source: &PcmAsset, rate: f32) -> Result<PcmAsset, InvalidRate> {
    let rate = validate_rate(rate)?;
    let step = rate as f64;
    let src = &source.samples;

    let out_len = (src.len() as f64 / step) as usize;
    let mut out = Vec::with_capacity(out_len);

    for n in 0..out_len {
        let pos = n as f64 * step;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;

        let left = src.get(idx).copied().unwrap_or(0.0);
        let right = src.get(idx + 1).copied().unwrap_or(0.0);
        out.push(left + (right - left) * frac);
    }

    log::debug!(
        "Rendered {} samples at {}x into {} samples",
        src.len(),
        rate,
        out.len()
    );

    Ok(PcmAsset::new(out, source.sample_rate))
}
