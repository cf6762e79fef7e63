//! Configuration
//!
//! Typed configuration with json5 loading and an environment override for
//! the bot token. Every section has defaults, so a config file is only
//! needed to change something.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::channels::telegram::TelegramConfig;
use crate::logging::LoggingConfig;

/// Environment variable that overrides `telegram.botToken`.
pub const TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },

    #[error("no bot token: set telegram.botToken or the TELEGRAM_BOT_TOKEN environment variable")]
    MissingToken,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Telegram transport settings.
    pub telegram: TelegramConfig,
    /// Round lifecycle settings.
    pub rounds: RoundsConfig,
    /// Question bank settings.
    pub questions: QuestionsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Round lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoundsConfig {
    /// Seconds between arming and finalization.
    pub countdown_seconds: u64,
}

impl Default for RoundsConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 20,
        }
    }
}

/// Question bank settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionsConfig {
    /// Path to the question file.
    pub path: PathBuf,
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("questions.txt"),
        }
    }
}

impl Config {
    /// Default config file location under the user config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dilemma")
            .join("config.json5")
    }

    /// Load configuration: the given file, or the default path when it
    /// exists, or pure defaults; then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        json5::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                self.telegram.bot_token = token;
            }
        }
    }

    /// Fail fast when no token is configured anywhere.
    pub fn require_token(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }
}
