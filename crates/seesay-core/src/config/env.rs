//! Environment variable overrides applied on top of the config file.

use crate::error::ConfigError;

use super::{Config, OllamaConfig};

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Plain strings pass through; empty strings and unset variables give `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Config {
    /// Apply overrides from named environment variables.
    ///
    /// `lookup` resolves a variable name to its value; `Config::load` passes
    /// the process environment, tests pass a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("VISION_PROVIDER") {
            self.vision.provider = provider;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.vision
                .ollama
                .get_or_insert_with(OllamaConfig::default)
                .model = model;
        }
        if let Some(endpoint) = lookup("OLLAMA_HOST") {
            self.vision
                .ollama
                .get_or_insert_with(OllamaConfig::default)
                .endpoint = endpoint;
        }
        if let Some(temperature) = lookup("MODEL_TEMPERATURE") {
            self.vision.temperature = temperature.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "MODEL_TEMPERATURE must be a number, got '{temperature}'"
                ))
            })?;
        }
        if let Some(voice) = lookup("TTS_VOICE") {
            self.speech.voice = voice;
        }
        if let Some(voice) = lookup("FALLBACK_VOICE") {
            self.speech.fallback_voice = voice;
        }
        if let Some(rate) = lookup("SPEECH_RATE") {
            self.speech.rate = rate
                .parse()
                .map_err(|e| ConfigError::ValidationError(format!("SPEECH_RATE: {e}")))?;
        }
        if let Some(endpoint) = lookup("TTS_ENDPOINT") {
            self.speech.endpoint = endpoint;
        }
        Ok(())
    }
}
