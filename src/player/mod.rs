pub mod playerctl;

use async_trait::async_trait;

pub use playerctl::Playerctl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    /// No player running, or the query failed.
    Unavailable,
}

impl PlaybackState {
    /// Map a player-reported status string. Anything other than
    /// playing/paused (e.g. "Stopped") counts as unavailable.
    pub fn from_status(status: &str) -> Self {
        match status.trim() {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            _ => Self::Unavailable,
        }
    }
}

/// One poll tick's observation of the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub title: String,
    pub artist: String,
    pub position_ms: u64,
    pub state: PlaybackState,
}

impl PlaybackSnapshot {
    pub fn unavailable() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            position_ms: 0,
            state: PlaybackState::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        self.state != PlaybackState::Unavailable
    }
}

/// Player control capability: one fresh snapshot per call, no caching.
#[async_trait]
pub trait PlaybackSource: Send + Sync {
    /// Never fails: any problem is logged and reported as `Unavailable`.
    async fn snapshot(&self) -> PlaybackSnapshot;
}

/// Convert a player position in seconds to whole milliseconds, truncating.
pub fn seconds_to_ms(seconds: f64) -> Option<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds * 1000.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PlaybackState::from_status("Playing\n"), PlaybackState::Playing);
        assert_eq!(PlaybackState::from_status("Paused"), PlaybackState::Paused);
        assert_eq!(PlaybackState::from_status("Stopped"), PlaybackState::Unavailable);
        assert_eq!(PlaybackState::from_status(""), PlaybackState::Unavailable);
        assert_eq!(PlaybackState::from_status("playing"), PlaybackState::Unavailable);
    }

    #[test]
    fn test_seconds_to_ms_truncates() {
        assert_eq!(seconds_to_ms(0.0), Some(0));
        assert_eq!(seconds_to_ms(12.3459), Some(12_345));
        assert_eq!(seconds_to_ms(1.0009), Some(1_000));
        assert_eq!(seconds_to_ms(-1.0), None);
        assert_eq!(seconds_to_ms(f64::NAN), None);
        assert_eq!(seconds_to_ms(f64::INFINITY), None);
    }
}
