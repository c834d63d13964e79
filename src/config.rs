//! Daemon configuration.
//!
//! Settings come from a JSON file (`--config`, else
//! `~/.focusdeck/config.json` when present) and are then overridden by
//! command-line flags. Every field has a default, so an empty object or a
//! missing file is a valid configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::daemon::pomodoro::PomodoroPolicy;
use crate::types::SoundSettings;

/// Directory under the home directory holding the socket and config.
pub const APP_DIR_NAME: &str = ".focusdeck";

/// Socket file name inside the app directory.
pub const SOCKET_FILE_NAME: &str = "focusdeck.sock";

/// Config file name inside the app directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Complete daemon configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Pomodoro phase lengths
    #[serde(default)]
    pub pomodoro: PomodoroPolicy,
    /// Completion tone
    #[serde(default)]
    pub sound: SoundSettings,
    /// Whether completion tones are played at all
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Whether desktop notifications are shown
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Socket path override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            pomodoro: PomodoroPolicy::default(),
            sound: SoundSettings::default(),
            sound_enabled: true,
            notifications: true,
            socket_path: None,
        }
    }
}

impl ServiceConfig {
    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// read if present and defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Reads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("設定ファイルを読み込めません: {:?}", path))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("設定ファイルの形式が不正です: {:?}", path))?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        self.pomodoro.validate()?;
        self.sound.validate()?;
        Ok(())
    }

    /// Returns the socket path, falling back to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the home directory is
    /// unknown.
    pub fn resolved_socket_path(&self) -> Result<PathBuf> {
        match &self.socket_path {
            Some(path) => Ok(path.clone()),
            None => default_socket_path(),
        }
    }
}

/// Returns `~/.focusdeck`, if the home directory is known.
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR_NAME))
}

/// Returns `~/.focusdeck/config.json`, if the home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Returns `~/.focusdeck/focusdeck.sock`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    app_dir()
        .map(|dir| dir.join(SOCKET_FILE_NAME))
        .context("ホームディレクトリが見つかりません")
}
