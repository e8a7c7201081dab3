//! Configuration management for seesay.
//!
//! Configuration is loaded once at startup from the platform config file
//! (if any), then environment overrides are applied, then values are
//! validated. The resulting `Config` is handed to each component's
//! constructor.

mod env;
mod types;
mod validate;

pub use env::resolve_env_var;
pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for seesay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upload and audio directories
    pub storage: StorageConfig,

    /// Accepted input formats
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Vision model settings
    pub vision: VisionConfig,

    /// Speech synthesis settings
    pub speech: SpeechConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location, then apply environment
    /// overrides.
    ///
    /// Uses defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::read_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.seesay.seesay/config.toml
    /// - Linux: ~/.config/seesay/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\seesay\config\config.toml
    ///
    /// Falls back to ~/.seesay/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "seesay", "seesay")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".seesay").join("config.toml")
            })
    }

    /// Resolved upload directory (with ~ expansion).
    pub fn upload_dir(&self) -> PathBuf {
        expand(&self.storage.upload_dir)
    }

    /// Resolved audio directory (with ~ expansion).
    pub fn audio_dir(&self) -> PathBuf {
        expand(&self.storage.audio_dir)
    }

    /// Retention window for generated files.
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.storage.retention_hours.saturating_mul(3600))
    }

    /// Create the upload and audio directories if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.upload_dir())?;
        std::fs::create_dir_all(self.audio_dir())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
