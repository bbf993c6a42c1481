//! Configuration loading for chess-session.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the game is stored between invocations.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Board orientation for a new session.
    #[serde(default)]
    pub flipped: bool,
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".chess-session.json")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            session_path: default_session_path(),
            log_level: default_log_level(),
            flipped: false,
        }
    }
}

impl Config {
    /// Reads the config file at `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading config {}", path.display()))
            }
        };
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
