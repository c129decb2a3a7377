//! Lyric synchronization engine
//!
//! Maps a stream of playback snapshots onto the current track's lyric lines.
//! All state lives in one owned `SyncState` that the poll loop threads
//! through `SyncState::step` once per tick.
//!
//! The cursor only moves forward within a track. Seeking backwards is not
//! detected: until playback catches up with the cursor line again the engine
//! shows an empty line.

use crate::lyrics::{self, LyricSet, LyricsSource};
use crate::player::{PlaybackSnapshot, PlaybackState};

/// (title, artist) pair used for track change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackKey {
    pub title: String,
    pub artist: String,
}

impl TrackKey {
    fn matches(&self, snapshot: &PlaybackSnapshot) -> bool {
        self.title == snapshot.title && self.artist == snapshot.artist
    }
}

/// What the engine decided to show for one tick, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// Player missing or query failed.
    Unavailable,
    /// Playing, but no lyric line is active (before the first line, no lyrics, or after a backward seek).
    Silent,
    /// Playing; the active line.
    Line(String),
    /// Paused; the last line shown while playing (may be empty).
    Held(String),
}

#[derive(Debug, Clone, Default)]
pub struct SyncState {
    current_track: Option<TrackKey>,
    lyrics: LyricSet,
    /// Index of the last line at or before the latest observed position. 0 when `lyrics` is empty.
    cursor: usize,
    last_line: String,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_track(&self) -> Option<&TrackKey> {
        self.current_track.as_ref()
    }

    pub fn lyrics(&self) -> &LyricSet {
        &self.lyrics
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_line(&self) -> &str {
        &self.last_line
    }

    /// Run one tick. Lyrics are fetched from `source` (once) whenever the
    /// snapshot names a different track than the current one, playing or not.
    pub async fn step<S: LyricsSource + ?Sized>(
        mut self,
        snapshot: &PlaybackSnapshot,
        source: &S,
    ) -> (Self, Cue) {
        if snapshot.state == PlaybackState::Unavailable {
            return (self, Cue::Unavailable);
        }

        if !self.is_current(snapshot) {
            tracing::info!("track changed: {} - {}", snapshot.title, snapshot.artist);
            let lyrics = lyrics::fetch_lyrics(source, &snapshot.title, &snapshot.artist).await;
            self.load_track(
                TrackKey {
                    title: snapshot.title.clone(),
                    artist: snapshot.artist.clone(),
                },
                lyrics,
            );
        }

        let cue = match snapshot.state {
            PlaybackState::Playing => self.advance(snapshot.position_ms),
            PlaybackState::Paused => Cue::Held(self.last_line.clone()),
            PlaybackState::Unavailable => Cue::Unavailable,
        };
        (self, cue)
    }

    fn is_current(&self, snapshot: &PlaybackSnapshot) -> bool {
        self.current_track
            .as_ref()
            .is_some_and(|key| key.matches(snapshot))
    }

    /// Replace the track and its lyrics, rewinding the cursor.
    pub fn load_track(&mut self, key: TrackKey, lyrics: LyricSet) {
        self.current_track = Some(key);
        self.lyrics = lyrics;
        self.cursor = 0;
        self.last_line.clear();
    }

    /// Scan forward from the cursor for the last line at or before `position_ms`.
    fn advance(&mut self, position_ms: u64) -> Cue {
        let found = self.lyrics.lines()[self.cursor.min(self.lyrics.len())..]
            .iter()
            .take_while(|line| line.timestamp_ms <= position_ms)
            .count();
        if found == 0 {
            return Cue::Silent;
        }

        self.cursor += found - 1;
        let Some(text) = self.lyrics.get(self.cursor).map(|l| l.text.clone()) else {
            return Cue::Silent;
        };
        tracing::debug!(cursor = self.cursor, position_ms, "lyric line");
        self.last_line.clone_from(&text);
        Cue::Line(text)
    }
}

/// How cues become display text. The decision logic above is the same for
/// every presentation; only the final string differs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presentation {
    /// Shown while no player is available.
    pub placeholder: String,
    /// Prepended to the held line while paused (only when that line is non-empty).
    pub paused_prefix: Option<String>,
}

impl Presentation {
    pub fn render(&self, cue: &Cue) -> String {
        match cue {
            Cue::Unavailable => self.placeholder.clone(),
            Cue::Silent => String::new(),
            Cue::Line(text) => text.clone(),
            Cue::Held(text) => match &self.paused_prefix {
                Some(prefix) if !text.is_empty() => format!("{prefix}{text}"),
                _ => text.clone(),
            },
        }
    }
}
