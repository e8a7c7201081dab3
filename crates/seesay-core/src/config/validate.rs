//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.allowed_extensions must not be empty".into(),
            ));
        }
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_bytes must be > 0".into(),
            ));
        }
        if self.limits.vision_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.vision_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.speech_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.speech_timeout_ms must be > 0".into(),
            ));
        }
        if self.storage.retention_hours.checked_mul(3600).is_none() {
            return Err(ConfigError::ValidationError(
                "storage.retention_hours is too large".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.vision.temperature) {
            return Err(ConfigError::ValidationError(
                "vision.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.speech.voice.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "speech.voice must not be empty".into(),
            ));
        }
        if self.speech.fallback_voice.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "speech.fallback_voice must not be empty".into(),
            ));
        }
        if self.speech.format.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "speech.format must not be empty".into(),
            ));
        }
        Ok(())
    }
}
