use super::{PlaybackSnapshot, PlaybackSource, PlaybackState, seconds_to_ms};
use anyhow::Context;
use async_trait::async_trait;
use tokio::process::Command;

/// MPRIS players via the `playerctl` CLI.
#[derive(Debug, Clone)]
pub struct Playerctl {
    /// Program plus leading arguments; `["playerctl"]` outside tests.
    launcher: Vec<String>,
    /// `--player` selector; `None` lets playerctl pick the first active player.
    player: Option<String>,
}

enum Probe {
    Snapshot(PlaybackSnapshot),
    NoPlayer(String),
}

struct Reply {
    success: bool,
    stdout: String,
    detail: String,
}

impl Default for Playerctl {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Playerctl {
    pub fn new(player: Option<String>) -> Self {
        Self {
            launcher: vec!["playerctl".to_string()],
            player,
        }
    }

    #[cfg(test)]
    fn with_launcher(launcher: Vec<String>, player: Option<String>) -> Self {
        Self { launcher, player }
    }

    fn command(&self, args: &[&str]) -> Command {
        let (program, leading) = self
            .launcher
            .split_first()
            .map_or(("playerctl", &[][..]), |(p, rest)| (p.as_str(), rest));
        let mut cmd = Command::new(program);
        cmd.args(leading);
        if let Some(p) = &self.player {
            cmd.arg(format!("--player={p}"));
        }
        cmd.args(args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Run one playerctl invocation. Spawn failures and non-utf-8 output are errors;
    /// the exit status is left for the caller to judge.
    async fn run(&self, args: &[&str]) -> anyhow::Result<Reply> {
        let out = self
            .command(args)
            .output()
            .await
            .with_context(|| format!("run playerctl {}", args.join(" ")))?;
        let stdout = String::from_utf8(out.stdout).context("playerctl output is not utf-8")?;
        Ok(Reply {
            success: out.status.success(),
            stdout: stdout.trim_end_matches(['\n', '\r']).to_string(),
            detail: format!(
                "playerctl {} exited with {}: {}",
                args.join(" "),
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        })
    }

    async fn query(&self, args: &[&str]) -> anyhow::Result<String> {
        let reply = self.run(args).await?;
        if !reply.success {
            anyhow::bail!(reply.detail);
        }
        Ok(reply.stdout)
    }

    /// `playerctl metadata <key>` exits non-zero with no output when the tag is
    /// missing; that is an empty value, not a player failure.
    async fn metadata(&self, key: &str) -> anyhow::Result<String> {
        let reply = self.run(&["metadata", key]).await?;
        if !reply.success && !reply.stdout.is_empty() {
            anyhow::bail!(reply.detail);
        }
        if !reply.success {
            tracing::debug!("no {key} tag: {}", reply.detail);
        }
        Ok(reply.stdout)
    }

    async fn probe(&self) -> anyhow::Result<Probe> {
        // playerctl exits non-zero with "No players found" when nothing is running
        let status = match self.query(&["status"]).await {
            Ok(s) => s,
            Err(e) => return Ok(Probe::NoPlayer(format!("{e:#}"))),
        };
        let state = PlaybackState::from_status(&status);
        if state == PlaybackState::Unavailable {
            return Ok(Probe::NoPlayer(format!("player status {status:?}")));
        }

        let title = self.metadata("title").await?;
        let artist = self.metadata("artist").await?;
        let position = self.query(&["position"]).await?;
        let position_ms = parse_position(&position)?;

        Ok(Probe::Snapshot(PlaybackSnapshot {
            title,
            artist,
            position_ms,
            state,
        }))
    }
}

#[async_trait]
impl PlaybackSource for Playerctl {
    async fn snapshot(&self) -> PlaybackSnapshot {
        match self.probe().await {
            Ok(Probe::Snapshot(s)) => s,
            Ok(Probe::NoPlayer(why)) => {
                tracing::debug!("no active player: {why}");
                PlaybackSnapshot::unavailable()
            }
            Err(e) => {
                tracing::warn!("error getting media info: {e:#}");
                PlaybackSnapshot::unavailable()
            }
        }
    }
}

/// `playerctl position` prints fractional seconds, e.g. "83.512345".
fn parse_position(raw: &str) -> anyhow::Result<u64> {
    let seconds: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("parse playerctl position {raw:?}"))?;
    seconds_to_ms(seconds).with_context(|| format!("invalid playerctl position {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("83.512345\n").unwrap(), 83_512);
        assert_eq!(parse_position("0").unwrap(), 0);
        assert!(parse_position("").is_err());
        assert!(parse_position("-3.0").is_err());
        assert!(parse_position("No player could handle this command").is_err());
    }

    #[test]
    fn test_player_selector() {
        let cmd = Playerctl::new(Some("spotify".to_string())).command(&["status"]);
        assert_eq!(cmd.as_std().get_program(), "playerctl");
        let args: Vec<_> = cmd.as_std().get_args().collect();
        assert_eq!(args, ["--player=spotify", "status"]);

        let cmd = Playerctl::default().command(&["metadata", "title"]);
        let args: Vec<_> = cmd.as_std().get_args().collect();
        assert_eq!(args, ["metadata", "title"]);
    }

    #[cfg(unix)]
    mod fake_player {
        use super::*;

        /// A shell stand-in for playerctl. `body` is the inside of a `case "$*" in ... esac`.
        struct FakePlayerctl {
            _dir: tempfile::TempDir,
            player: Playerctl,
        }

        impl FakePlayerctl {
            fn new(body: &str) -> Self {
                let dir = tempfile::tempdir().unwrap();
                let script = dir.path().join("playerctl.sh");
                std::fs::write(&script, format!("case \"$*\" in\n{body}\nesac\n")).unwrap();
                let player = Playerctl::with_launcher(
                    vec!["sh".to_string(), script.display().to_string()],
                    None,
                );
                Self { _dir: dir, player }
            }
        }

        const PLAYING: &str = r#"status) echo Playing ;;
"metadata title") echo "Untagged Song" ;;
"metadata artist") echo "Some Band" ;;
position) echo 12.5 ;;"#;

        #[tokio::test]
        async fn test_full_snapshot() {
            let fake = FakePlayerctl::new(PLAYING);
            assert_eq!(
                fake.player.snapshot().await,
                PlaybackSnapshot {
                    title: "Untagged Song".to_string(),
                    artist: "Some Band".to_string(),
                    position_ms: 12_500,
                    state: PlaybackState::Playing,
                }
            );
        }

        #[tokio::test]
        async fn test_missing_artist_tag_is_empty() {
            let fake = FakePlayerctl::new(
                r#"status) echo Paused ;;
"metadata title") echo "Untagged Song" ;;
"metadata artist") exit 1 ;;
position) echo 12.5 ;;"#,
            );
            assert_eq!(
                fake.player.snapshot().await,
                PlaybackSnapshot {
                    title: "Untagged Song".to_string(),
                    artist: String::new(),
                    position_ms: 12_500,
                    state: PlaybackState::Paused,
                }
            );
        }

        #[tokio::test]
        async fn test_no_players_found() {
            let fake = FakePlayerctl::new(r#"*) echo "No players found" >&2; exit 1 ;;"#);
            assert_eq!(fake.player.snapshot().await, PlaybackSnapshot::unavailable());
        }

        #[tokio::test]
        async fn test_stopped_is_unavailable() {
            let fake = FakePlayerctl::new(
                r#"status) echo Stopped ;;
*) echo "should not be asked"; exit 1 ;;"#,
            );
            assert_eq!(fake.player.snapshot().await, PlaybackSnapshot::unavailable());
        }

        #[tokio::test]
        async fn test_position_failure_is_unavailable() {
            let fake = FakePlayerctl::new(
                r#"status) echo Playing ;;
"metadata title") echo Song ;;
"metadata artist") echo Band ;;
position) echo "No player could handle this command" >&2; exit 1 ;;"#,
            );
            assert_eq!(fake.player.snapshot().await, PlaybackSnapshot::unavailable());
        }

        #[tokio::test]
        async fn test_garbled_position_is_unavailable() {
            let fake = FakePlayerctl::new(
                r#"status) echo Playing ;;
"metadata title") echo Song ;;
"metadata artist") echo Band ;;
position) echo soon ;;"#,
            );
            assert_eq!(fake.player.snapshot().await, PlaybackSnapshot::unavailable());
        }

        #[tokio::test]
        async fn test_metadata_error_with_output_is_a_failure() {
            let fake = FakePlayerctl::new(
                r#"status) echo Playing ;;
"metadata title") echo "Could not connect to players"; exit 1 ;;
"metadata artist") echo Band ;;
position) echo 1.0 ;;"#,
            );
            assert_eq!(fake.player.snapshot().await, PlaybackSnapshot::unavailable());
        }

        #[tokio::test]
        async fn test_missing_binary_is_unavailable() {
            let player = Playerctl::with_launcher(
                vec!["/nonexistent/waylrc-playerctl".to_string()],
                None,
            );
            assert_eq!(player.snapshot().await, PlaybackSnapshot::unavailable());
        }
    }
}
