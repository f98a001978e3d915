//! Configuration types for the daemon.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::library::Game;

/// Complete daemon configuration loaded from JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Library name; unrecognized values fall back to the default game.
    #[serde(default = "default_game")]
    pub game: String,
    /// Root of the track library. `None` means the current directory.
    #[serde(default)]
    pub library_root: Option<PathBuf>,
    pub home_assistant: HomeAssistantConfig,
}

/// Home Assistant connection parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HomeAssistantConfig {
    pub auth: AuthConfig,
    /// Weather entity to query, e.g. `weather.home`.
    #[serde(default = "default_entity")]
    pub entity: String,
}

/// REST API credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub token: String,
}

fn default_game() -> String {
    "new-horizons".to_string()
}

fn default_entity() -> String {
    "weather.home".to_string()
}

impl Default for Config {
    /// The template written on first run. Auth fields are intentionally
    /// empty so an unedited template fails validation instead of hammering
    /// a nonexistent endpoint.
    fn default() -> Self {
        Self {
            game: default_game(),
            library_root: None,
            home_assistant: HomeAssistantConfig {
                auth: AuthConfig::default(),
                entity: default_entity(),
            },
        }
    }
}

impl Config {
    /// The game to play from, with the unrecognized-name fallback applied.
    pub fn game(&self) -> Game {
        Game::from_name(&self.game)
    }

    /// Track library root, defaulting to the current directory.
    pub fn library_root(&self) -> PathBuf {
        self.library_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Rejects configs that cannot possibly reach Home Assistant, so the
    /// daemon fails at startup rather than at the first weather poll.
    pub fn validate(&self) -> Result<()> {
        if self.home_assistant.auth.api_url.is_empty() {
            return Err(Error::ConfigValidation(
                "home_assistant.auth.api_url".to_string(),
                "API URL cannot be empty".to_string(),
            ));
        }
        if self.home_assistant.auth.token.is_empty() {
            return Err(Error::ConfigValidation(
                "home_assistant.auth.token".to_string(),
                "Token cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
