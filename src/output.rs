use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// One status-bar update, e.g. `{"text":"Hello world"}`.
#[derive(Debug, Serialize)]
struct StatusLine<'a> {
    text: &'a str,
}

/// Line-oriented JSON sink. Every record is flushed immediately since the
/// consumer reads line by line.
pub struct StatusSink<W> {
    writer: W,
}

impl StatusSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> StatusSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn emit(&mut self, text: &str) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(&StatusLine { text }).context("encode status json")?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .await
            .context("write status line")?;
        self.writer.flush().await.context("flush status line")?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
