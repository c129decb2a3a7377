use crate::config::PollConfig;
use crate::lyrics::LyricsSource;
use crate::output::StatusSink;
use crate::player::PlaybackSource;
use crate::sync::{Presentation, SyncState};
use anyhow::Context;
use std::time::Duration;
use tokio::io::AsyncWrite;

/// The poll loop: snapshot the player, step the sync engine, emit a line, sleep.
pub struct App<P, L> {
    player: P,
    lyrics: L,
    presentation: Presentation,
    poll: PollConfig,
}

impl<P: PlaybackSource, L: LyricsSource> App<P, L> {
    pub fn new(player: P, lyrics: L, presentation: Presentation, poll: PollConfig) -> Self {
        Self {
            player,
            lyrics,
            presentation,
            poll,
        }
    }

    /// Poll until Ctrl-C. Only a broken output stream ends the loop with an error.
    pub async fn run<W: AsyncWrite + Unpin>(&self, sink: &mut StatusSink<W>) -> anyhow::Result<()> {
        tracing::info!(
            interval_ms = self.poll.interval_ms,
            idle_interval_ms = self.poll.idle_interval_ms,
            "polling player"
        );

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut state = SyncState::new();
        loop {
            tokio::select! {
                res = &mut shutdown => {
                    res.context("listen for ctrl-c")?;
                    tracing::info!("interrupted, exiting");
                    return Ok(());
                }
                res = self.cycle(&mut state, sink) => res?,
            }
        }
    }

    async fn cycle<W: AsyncWrite + Unpin>(
        &self,
        state: &mut SyncState,
        sink: &mut StatusSink<W>,
    ) -> anyhow::Result<()> {
        let (next, delay) = self.tick(std::mem::take(state), sink).await?;
        *state = next;
        tokio::time::sleep(delay).await;
        Ok(())
    }

    /// One poll tick. Returns the new state and how long to wait before the next one.
    pub async fn tick<W: AsyncWrite + Unpin>(
        &self,
        state: SyncState,
        sink: &mut StatusSink<W>,
    ) -> anyhow::Result<(SyncState, Duration)> {
        let snapshot = self.player.snapshot().await;
        let (state, cue) = state.step(&snapshot, &self.lyrics).await;
        sink.emit(&self.presentation.render(&cue)).await?;

        let delay = if snapshot.is_available() {
            self.poll.interval()
        } else {
            self.poll.idle_interval()
        };
        Ok((state, delay))
    }
}
