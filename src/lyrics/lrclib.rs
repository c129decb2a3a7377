//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API that provides synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use super::LyricsSource;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// One entry of an LRCLIB search response. Only the fields we read; the
/// rest of the record is ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct LrclibResponse {
    #[serde(rename = "trackName")]
    pub track_name: Option<String>,
    #[serde(rename = "artistName")]
    pub artist_name: Option<String>,
    #[serde(rename = "syncedLyrics")]
    pub synced_lyrics: Option<String>,
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";
    const USER_AGENT: &'static str = concat!("waylrc/", env!("CARGO_PKG_VERSION"));

    /// Create a new LRCLIB client. `timeout` of `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(Self::USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().context("build http client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, title: &str, artist: &str) -> String {
        let query = format!("{} {}", title, artist);
        format!("{}/search?q={}", self.base_url, urlencoding::encode(&query))
    }

    /// Search for lyrics. Only the top-ranked candidate is decoded, so an
    /// odd-shaped later entry can't spoil a good first one.
    pub async fn search_first(
        &self,
        title: &str,
        artist: &str,
    ) -> anyhow::Result<Option<LrclibResponse>> {
        let url = self.search_url(title, artist);
        tracing::debug!(%url, "lrclib search");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("send lrclib search")?;

        if response.status().is_success() {
            let results: Vec<serde_json::Value> =
                response.json().await.context("decode lrclib search")?;
            tracing::debug!(candidates = results.len(), "lrclib results");
            results
                .into_iter()
                .next()
                .map(serde_json::from_value::<LrclibResponse>)
                .transpose()
                .context("decode lrclib result")
        } else if response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            anyhow::bail!("LRCLIB search error: {}", response.status());
        }
    }
}

#[async_trait]
impl LyricsSource for LrclibClient {
    async fn synced_lyrics(&self, title: &str, artist: &str) -> anyhow::Result<Option<String>> {
        if title.trim().is_empty() && artist.trim().is_empty() {
            return Ok(None);
        }

        // First result only; a later candidate with synced lyrics is not consulted
        let first = self.search_first(title, artist).await?;
        if let Some(first) = &first {
            tracing::debug!(
                track = first.track_name.as_deref().unwrap_or(""),
                artist = first.artist_name.as_deref().unwrap_or(""),
                "lrclib match"
            );
        }
        Ok(first_synced(first))
    }
}

fn first_synced(first: Option<LrclibResponse>) -> Option<String> {
    first
        .and_then(|r| r.synced_lyrics)
        .filter(|s| !s.trim().is_empty())
}
