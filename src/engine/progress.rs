//! Engine progress and diagnostic stream parsing

use std::collections::VecDeque;
use std::time::Duration;

use crate::domain::model::EncodeProgress;

/// Default number of diagnostic lines kept for failure reports
pub const DEFAULT_TAIL_LINES: usize = 20;

/// Longest diagnostic line kept, in characters
pub const MAX_LINE_CHARS: usize = 512;

/// Incremental parser for the engine's `-progress` key=value stream.
///
/// Each record is a block of `key=value` lines terminated by
/// `progress=continue` or `progress=end`. Reported `out_time` never
/// decreases.
#[derive(Debug, Default)]
pub struct ProgressParser {
    pending: EncodeProgress,
    last_out_time: Duration,
    finished: bool,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns a record when a block completes
    pub fn feed_line(&mut self, line: &str) -> Option<EncodeProgress> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();

        match key.trim() {
            "out_time_us" => {
                if let Ok(micros) = value.parse::<i64>() {
                    self.pending.out_time = Duration::from_micros(micros.max(0) as u64);
                }
            }
            "out_time" => {
                // Only used when the microsecond field is unavailable
                if self.pending.out_time.is_zero() {
                    if let Some(out_time) = parse_clock(value) {
                        self.pending.out_time = out_time;
                    }
                }
            }
            "speed" => {
                self.pending.speed = value
                    .trim_end_matches('x')
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|speed| speed.is_finite() && *speed >= 0.0);
            }
            "progress" => {
                if value == "end" {
                    self.finished = true;
                }
                let mut record = std::mem::take(&mut self.pending);
                if record.out_time < self.last_out_time {
                    record.out_time = self.last_out_time;
                }
                self.last_out_time = record.out_time;
                return Some(record);
            }
            _ => {}
        }
        None
    }

    /// True once the engine reported `progress=end`
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Parse `HH:MM:SS[.fraction]`; negative clocks clamp to zero
pub fn parse_clock(value: &str) -> Option<Duration> {
    if value.starts_with('-') {
        return Some(Duration::ZERO);
    }
    let mut parts = value.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs(hours * 3600 + minutes * 60) + Duration::from_secs_f64(seconds))
}

/// Bounded tail of the engine's diagnostic stream
#[derive(Debug, Clone)]
pub struct DiagnosticTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DiagnosticTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a line, dropping the oldest once full
    pub fn push(&mut self, line: &str) {
        let line = line.trim_end();
        if line.is_empty() || self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(truncate_chars(line, MAX_LINE_CHARS));
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines.into_iter().collect()
    }
}

impl Default for DiagnosticTail {
    fn default() -> Self {
        Self::new(DEFAULT_TAIL_LINES)
    }
}

fn truncate_chars(line: &str, max: usize) -> String {
    match line.char_indices().nth(max) {
        Some((cut, _)) => line[..cut].to_string(),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut ProgressParser, text: &str) -> Vec<EncodeProgress> {
        text.lines().filter_map(|line| parser.feed_line(line)).collect()
    }

    #[test]
    fn test_parse_progress_block() {
        let mut parser = ProgressParser::new();
        let records = feed_all(
            &mut parser,
            "frame=120\nfps=30.0\nout_time_us=4000000\nout_time=00:00:04.000000\nspeed=1.52x\nprogress=continue\n",
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].out_time, Duration::from_secs(4));
        assert_eq!(records[0].speed, Some(1.52));
        assert!(!parser.is_finished());
    }

    #[test]
    fn test_out_time_fallback_and_unknown_speed() {
        let mut parser = ProgressParser::new();
        let records = feed_all(
            &mut parser,
            "out_time_us=N/A\nout_time=01:02:03.500000\nspeed=N/A\nprogress=end\n",
        );

        assert_eq!(records[0].out_time, Duration::from_millis(3_723_500));
        assert_eq!(records[0].speed, None);
        assert!(parser.is_finished());
    }

    #[test]
    fn test_out_time_never_decreases() {
        let mut parser = ProgressParser::new();
        let records = feed_all(
            &mut parser,
            "out_time_us=5000000\nprogress=continue\nout_time_us=3000000\nprogress=continue\n",
        );
        assert_eq!(records[1].out_time, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("00:00:01.250000"), Some(Duration::from_millis(1250)));
        assert_eq!(parse_clock("-00:00:00.023220"), Some(Duration::ZERO));
        assert_eq!(parse_clock("N/A"), None);
        assert_eq!(parse_clock("1:2"), None);
    }

    #[test]
    fn test_diagnostic_tail_is_bounded() {
        let mut tail = DiagnosticTail::new(3);
        for index in 0..10 {
            tail.push(&format!("line {}", index));
        }
        tail.push("   ");
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.into_lines(), vec!["line 7", "line 8", "line 9"]);
    }

    #[test]
    fn test_diagnostic_lines_are_truncated_on_char_boundary() {
        let mut tail = DiagnosticTail::default();
        tail.push(&"é".repeat(MAX_LINE_CHARS + 10));
        let lines = tail.into_lines();
        assert_eq!(lines[0].chars().count(), MAX_LINE_CHARS);
    }
}
