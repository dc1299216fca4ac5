/// Bytes of trailing silence kept after the last audible sample
/// (about 20.8 ms of 16-bit mono audio at 24 kHz).
pub const TRIM_PADDING_BYTES: usize = 1000;

/// Strip trailing digital silence from 16-bit little-endian mono PCM.
///
/// Walks backward one sample (two bytes) at a time and stops at the first
/// sample with a non-zero byte. Everything up to that sample is kept, plus
/// `padding` bytes of the following silence, never exceeding the input length.
/// A dangling odd byte at the end is treated as audible and kept.
pub fn trim_trailing_silence(pcm: &[u8], padding: usize) -> &[u8] {
    let mut end = pcm.len();
    if end % 2 == 0 {
        while end >= 2 && pcm[end - 1] == 0 && pcm[end - 2] == 0 {
            end -= 2;
        }
    }

    let keep = end.saturating_add(padding).min(pcm.len());
    if keep < pcm.len() {
        log::debug!(
            "Trimmed {} bytes of trailing silence ({} kept as padding)",
            pcm.len() - keep,
            keep - end
        );
    }
    &pcm[..keep]
}
