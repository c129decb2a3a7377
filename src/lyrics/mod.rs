//! Lyrics module for fetching synchronized lyrics
//!
//! This module provides:
//! - The `LyricsSource` capability, implemented by the LRCLIB client
//! - A parser for timestamped lyric lines
//! - `fetch_lyrics`, which turns any source's answer into a `LyricSet`

pub mod lrclib;
pub mod parser;

use async_trait::async_trait;

pub use lrclib::LrclibClient;
pub use parser::{LyricLine, LyricSet};

/// Anything that can answer "raw synced lyrics for this title/artist".
#[async_trait]
pub trait LyricsSource: Send + Sync {
    /// `Ok(None)` when the service has no synced lyrics for the query.
    async fn synced_lyrics(&self, title: &str, artist: &str) -> anyhow::Result<Option<String>>;
}

/// Get lyrics for a track.
///
/// Failures never escape: they are logged and degrade to an empty set, so a
/// flaky lookup service can't take down the poll loop.
pub async fn fetch_lyrics<S: LyricsSource + ?Sized>(source: &S, title: &str, artist: &str) -> LyricSet {
    tracing::info!("fetching lyrics for: {title} by {artist}");
    match source.synced_lyrics(title, artist).await {
        Ok(Some(payload)) => {
            let lyrics = LyricSet::parse(&payload);
            tracing::debug!(lines = lyrics.len(), "parsed synced lyrics");
            lyrics
        }
        Ok(None) => {
            tracing::info!("no synced lyrics for: {title} by {artist}");
            LyricSet::default()
        }
        Err(e) => {
            tracing::warn!("error fetching lyrics: {e:#}");
            LyricSet::default()
        }
    }
}
