//! Synced lyrics parser
//!
//! Parses LRC-style timestamped lines:
//! [mm:ss.fff] Lyrics line here
//!
//! Example:
//! [00:12.340] Hello world
//! [00:15.000] Another line
//!
//! The fractional field is read as milliseconds verbatim, so `[00:12.34]`
//! lands at 12034ms, not 12340ms.

use once_cell::sync::Lazy;
use regex::Regex;

static TIMED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([0-9]+):([0-9]+)\.([0-9]+)\] (.+)").expect("valid lyric line pattern"));

/// A single line of lyrics with timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// The lyrics text (never empty)
    pub text: String,
    /// Timestamp in milliseconds from start
    pub timestamp_ms: u64,
}

impl LyricLine {
    pub fn new(text: String, minutes: u64, seconds: u64, millis: u64) -> Option<Self> {
        let timestamp_ms = minutes
            .checked_mul(60_000)?
            .checked_add(seconds.checked_mul(1_000)?)?
            .checked_add(millis)?;
        Some(Self { text, timestamp_ms })
    }

    /// Parse one raw line. Anything that doesn't match the timed-line shape is `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let caps = TIMED_LINE.captures(line)?;
        let minutes = caps[1].parse().ok()?;
        let seconds = caps[2].parse().ok()?;
        let millis = caps[3].parse().ok()?;
        Self::new(caps[4].to_string(), minutes, seconds, millis)
    }
}

impl std::fmt::Display for LyricLine {
    /// `[mm:ss.fff] text`, which parses back to the same timestamp.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let minutes = self.timestamp_ms / 60_000;
        let seconds = self.timestamp_ms / 1_000 % 60;
        let millis = self.timestamp_ms % 1_000;
        write!(f, "[{minutes:02}:{seconds:02}.{millis:03}] {}", self.text)
    }
}

/// Lyric lines for one track, ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricSet {
    lines: Vec<LyricLine>,
}

impl LyricSet {
    /// Parse a whole synced-lyrics payload, dropping malformed lines.
    pub fn parse(payload: &str) -> Self {
        Self::from_lines(payload.split('\n').filter_map(LyricLine::parse).collect())
    }

    pub fn from_lines(mut lines: Vec<LyricLine>) -> Self {
        // sort_by_key is stable: equal timestamps keep payload order
        lines.sort_by_key(|l| l.timestamp_ms);
        Self { lines }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
