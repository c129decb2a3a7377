use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lyrics::LrclibClient;
use crate::sync::Presentation;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poll: PollConfig,
    pub lyrics: LyricsConfig,
    pub player: PlayerConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay between ticks while a player is available.
    pub interval_ms: u64,
    /// Delay after a tick that found no player.
    pub idle_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    /// LRCLIB API root (the search endpoint is `{base_url}/search`).
    pub base_url: String,
    /// Request timeout. Unset keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PlayerConfig {
    /// playerctl `--player` name (see `playerctl --list-all`)
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct DisplayConfig {
    /// Text shown while no player is available
    pub placeholder: String,
    /// Prefix for the held line while paused
    pub paused_prefix: Option<String>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            idle_interval_ms: 1000,
        }
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            base_url: LrclibClient::DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

impl LyricsConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl DisplayConfig {
    pub fn presentation(&self) -> Presentation {
        Presentation {
            placeholder: self.placeholder.clone(),
            paused_prefix: self.paused_prefix.clone(),
        }
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o600));
    }
    Ok(path)
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj =
        ProjectDirs::from("dev", "waylrc", "waylrc").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Load the config file. A missing file means defaults; nothing is written.
pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("no config dir ({e:#}), using defaults");
                return Ok(Config::default());
            }
        },
    };

    if !path.exists() {
        // an explicit --config path must exist
        if override_path.is_some() {
            anyhow::bail!("config file {} not found", path.display());
        }
        return Ok(Config::default());
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.poll.interval(), Duration::from_millis(500));
        assert_eq!(cfg.poll.idle_interval(), Duration::from_millis(1000));
        assert_eq!(cfg.lyrics.base_url, "https://lrclib.net/api");
        assert_eq!(cfg.lyrics.timeout(), None);
        assert_eq!(cfg.display.presentation(), Presentation::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[poll]\ninterval_ms = 250\n\n[display]\npaused_prefix = \"|| \"\n",
        )
        .unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.poll.interval_ms, 250);
        assert_eq!(cfg.poll.idle_interval_ms, 1000);
        assert_eq!(cfg.display.paused_prefix.as_deref(), Some("|| "));
        assert_eq!(cfg.player.name, None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.player.name = Some("spotify".to_string());
        cfg.lyrics.timeout_secs = Some(10);

        assert_eq!(save(&cfg, Some(&path)).unwrap(), path);
        assert_eq!(load(Some(&path)).unwrap(), cfg);
    }

    #[test]
    fn test_missing_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[poll]\ninterval_ms = \"soon\"\n").unwrap();
        assert!(load(Some(&path)).is_err());
    }
}
