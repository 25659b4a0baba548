//! Arena configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use hex_engine::{MAX_BOARD_SIZE, TimeControlType, create_time_control};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Defaults applied to every game the arena creates.
///
/// ```toml
/// board_size = 11
/// allow_swap = true
///
/// [time_control]
/// type = "byoyomi"
/// options = { initialSeconds = 300, periodsCount = 5, periodSeconds = 30 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Board side length.
    #[serde(default = "default_board_size")]
    board_size: usize,

    /// Whether the swap-pieces rule is enabled.
    #[serde(default = "default_allow_swap")]
    allow_swap: bool,

    /// Clock used for every game.
    #[serde(default)]
    time_control: TimeControlType,
}

#[instrument]
fn default_board_size() -> usize {
    11
}

#[instrument]
fn default_allow_swap() -> bool {
    true
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            board_size: default_board_size(),
            allow_swap: default_allow_swap(),
            time_control: TimeControlType::default(),
        }
    }
}

impl ArenaConfig {
    /// Creates a configuration.
    #[instrument]
    pub fn new(board_size: usize, allow_swap: bool, time_control: TimeControlType) -> Self {
        Self {
            board_size,
            allow_swap,
            time_control,
        }
    }

    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(
            board_size = config.board_size,
            allow_swap = config.allow_swap,
            time_control = %config.time_control.kind(),
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Checks that games can be created from this configuration.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::new(format!(
                "board_size must be between 1 and {}, got {}",
                MAX_BOARD_SIZE, self.board_size
            )));
        }
        create_time_control(&self.time_control, None, chrono::Utc::now())
            .map_err(|e| ConfigError::new(format!("Invalid time_control: {}", e)))?;
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
