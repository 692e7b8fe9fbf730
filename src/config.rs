//! Configuration for taskdeck.
//!
//! Priority (highest first): CLI flags, the TOML file
//! (`~/.config/taskdeck/config.toml` or `--config`), compiled defaults.
//! A missing default file is not an error; an explicit `--config` path that
//! doesn't exist is.

use crate::notifications::{ToastDurations, ERROR_TOAST_MS, SUCCESS_TOAST_MS};
use crate::persistence::DEFAULT_DEBOUNCE_MS;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default event loop tick in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// TOML file layout, every field optional

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageSection,
    notifications: NotificationsSection,
    ui: UiSection,
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageSection {
    data_dir: Option<PathBuf>,
    debounce_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NotificationsSection {
    success_ms: Option<u64>,
    error_ms: Option<u64>,
    sound: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiSection {
    tick_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogSection {
    level: Option<String>,
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit data directory; None means local .taskdeck or ~/.taskdeck
    pub data_dir: Option<PathBuf>,
    /// Quiet period for input-triggered saves
    pub debounce: Duration,
    pub toasts: ToastDurations,
    pub sound: bool,
    /// Event loop poll interval
    pub tick: Duration,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            toasts: ToastDurations::default(),
            sound: true,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or the default location if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML content over the compiled defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(Self {
            data_dir: file.storage.data_dir,
            debounce: file
                .storage
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.debounce),
            toasts: ToastDurations {
                success: Duration::from_millis(
                    file.notifications.success_ms.unwrap_or(SUCCESS_TOAST_MS),
                ),
                error: Duration::from_millis(file.notifications.error_ms.unwrap_or(ERROR_TOAST_MS)),
            },
            sound: file.notifications.sound.unwrap_or(defaults.sound),
            tick: file
                .ui
                .tick_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick),
            log_level: file.log.level.unwrap_or(defaults.log_level),
        })
    }
}

/// `~/.config/taskdeck/config.toml` (platform config dir)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskdeck").join("config.toml"))
}
