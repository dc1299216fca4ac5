use serde::{Deserialize, Serialize};

/// Fixed per-line weight added on top of the character count.
const BASE_PADDING: usize = 2;
/// Extra weight per digit; numbers take longer to say than to write.
const DIGIT_WEIGHT: usize = 3;

/// Estimated time window of one script line inside the rendered audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptTiming {
    /// The full script line, label included.
    pub line: String,
    pub speaker: String,
    /// Seconds from the start of the audio.
    pub start_time: f64,
    pub end_time: f64,
}

impl ScriptTiming {
    /// Length of the window in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Text after the speaker label.
    pub fn message(&self) -> &str {
        self.line
            .split_once(':')
            .map(|(_, rest)| rest.trim())
            .unwrap_or(&self.line)
    }
}

struct WeightedLine<'a> {
    line: &'a str,
    speaker: &'a str,
    weight: usize,
}

fn weigh(line: &str) -> Option<WeightedLine<'_>> {
    let (speaker, rest) = line.split_once(':')?;
    if rest.is_empty() {
        return None;
    }
    let text = rest.trim();
    let chars = text.chars().count();
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();

    Some(WeightedLine {
        line,
        speaker: speaker.trim(),
        weight: chars + DIGIT_WEIGHT * digits + BASE_PADDING,
    })
}

/// Split `total_duration` seconds across the speaker-tagged lines of a
/// normalized script.
///
/// Lines without a colon are skipped. Each remaining line gets a share
/// proportional to `chars + 3 * digits + 2` of its text, so the windows are
/// ordered, contiguous and together cover `[0, total_duration]`. A script with
/// no tagged lines yields no windows.
pub fn estimate_timings(normalized_script: &str, total_duration: f64) -> Vec<ScriptTiming> {
    let lines: Vec<WeightedLine<'_>> = normalized_script
        .split('\n')
        .filter(|l| !l.trim().is_empty())
        .filter_map(weigh)
        .collect();

    let total_weight: usize = lines.iter().map(|l| l.weight).sum();
    if total_weight == 0 {
        return Vec::new();
    }

    let mut current = 0.0f64;
    lines
        .into_iter()
        .map(|l| {
            let duration = (l.weight as f64 / total_weight as f64) * total_duration;
            let timing = ScriptTiming {
                line: l.line.to_string(),
                speaker: l.speaker.to_string(),
                start_time: current,
                end_time: current + duration,
            };
            current = timing.end_time;
            timing
        })
        .collect()
}

/// Index of the window that contains `time`.
///
/// Windows are half-open, except that the very end of the audio belongs to
/// the last line.
pub fn active_line(timings: &[ScriptTiming], time: f64) -> Option<usize> {
    if let Some(idx) = timings
        .iter()
        .position(|t| time >= t.start_time && time < t.end_time)
    {
        return Some(idx);
    }
    match timings.last() {
        Some(last) if time == last.end_time => Some(timings.len() - 1),
        _ => None,
    }
}

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{mins}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn equal_lines_split_evenly() {
        let timings = estimate_timings("Male: Hi\nFemale: Hi", 2.0);
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].speaker, "Male");
        assert_eq!(timings[1].speaker, "Female");
        assert_relative_eq!(timings[0].start_time, 0.0);
        assert_relative_eq!(timings[0].end_time, 1.0);
        assert_relative_eq!(timings[1].start_time, 1.0);
        assert_relative_eq!(timings[1].end_time, 2.0);
    }

    #[test]
    fn digits_weigh_extra() {
        // "1. Hello" -> 8 chars + 3 + 2 = 13; "Hello there" -> 11 + 2 = 13.
        let timings = estimate_timings("Male: 1. Hello\nFemale: Hello there", 26.0);
        assert_relative_eq!(timings[0].duration(), 13.0, epsilon = 1e-9);
        assert_relative_eq!(timings[1].duration(), 13.0, epsilon = 1e-9);
    }

    #[test]
    fn windows_partition_the_duration() {
        let script = "Male: Good morning everyone\n\nFemale: 42 is the answer\nstray line\nMale: ok";
        let total = 17.3;
        let timings = estimate_timings(script, total);
        assert_eq!(timings.len(), 3);

        assert_eq!(timings[0].start_time, 0.0);
        for pair in timings.windows(2) {
            assert_eq!(pair[1].start_time, pair[0].end_time);
        }
        assert!(timings.iter().all(|t| t.duration() >= 0.0));
        let sum: f64 = timings.iter().map(ScriptTiming::duration).sum();
        assert_relative_eq!(sum, total, epsilon = 1e-9);
        assert_relative_eq!(timings.last().unwrap().end_time, total, epsilon = 1e-9);
    }

    #[test]
    fn untagged_script_has_no_windows() {
        assert!(estimate_timings("just words\n\nmore words", 5.0).is_empty());
        assert!(estimate_timings("", 5.0).is_empty());
        assert!(estimate_timings("Male:", 5.0).is_empty());
    }

    #[test]
    fn splits_on_first_colon_only() {
        let timings = estimate_timings("Male: Time is 10:30", 1.0);
        assert_eq!(timings[0].speaker, "Male");
        assert_eq!(timings[0].message(), "Time is 10:30");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let timings = estimate_timings("Female: Chào\nMale: Chao", 2.0);
        assert_relative_eq!(timings[0].duration(), timings[1].duration(), epsilon = 1e-12);
    }

    #[test]
    fn finds_active_line() {
        let timings = estimate_timings("Male: Hi\nFemale: Hi", 2.0);
        assert_eq!(active_line(&timings, 0.0), Some(0));
        assert_eq!(active_line(&timings, 0.99), Some(0));
        assert_eq!(active_line(&timings, 1.0), Some(1));
        assert_eq!(active_line(&timings, 2.0), Some(1));
        assert_eq!(active_line(&timings, 2.5), None);
        assert_eq!(active_line(&[], 0.0), None);
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.9), "0:09");
        assert_eq!(format_clock(75.2), "1:15");
        assert_eq!(format_clock(-3.0), "0:00");
    }
}
