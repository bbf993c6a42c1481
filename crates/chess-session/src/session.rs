//! A game persisted between invocations.

use anyhow::Context;
use chess_engine::Game;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The stored state: the game and how the board is turned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub game: Game,
    #[serde(default)]
    pub flipped: bool,
}

impl Session {
    pub fn new(flipped: bool) -> Self {
        Session {
            game: Game::new(),
            flipped,
        }
    }

    /// Loads the session stored at `path`, or starts a new one if there is
    /// none. A file that cannot be read back is an error, not a new game.
    pub fn load(path: &Path, flipped: bool) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no session file, starting a new game");
                return Ok(Session::new(flipped));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading session {}", path.display()))
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("session file {} is corrupt", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing session {}", path.display()))?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }
}
