//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::speech::SpeechRate;

/// Where uploads and generated audio live, and how long they are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for stored uploads
    pub upload_dir: PathBuf,

    /// Directory for generated audio
    pub audio_dir: PathBuf,

    /// Age in hours after which generated files may be removed
    pub retention_hours: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("~/.seesay/uploads"),
            audio_dir: PathBuf::from("~/.seesay/audio"),
            retention_hours: 24,
        }
    }
}

/// Accepted input formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Allowed file extensions (compared lowercase)
    pub allowed_extensions: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Resource limits and per-call deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in bytes
    pub max_upload_bytes: u64,

    /// Vision endpoint deadline in milliseconds
    pub vision_timeout_ms: u64,

    /// Speech endpoint deadline in milliseconds (per attempt)
    pub speech_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 16 * 1024 * 1024,
            vision_timeout_ms: 30_000,
            speech_timeout_ms: 30_000,
        }
    }
}

/// Vision-language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Provider identifier: "ollama" or "openai"
    pub provider: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,

    /// OpenAI-compatible configuration
    pub openai: Option<OpenAiConfig>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            temperature: 0.1,
            max_tokens: 150,
            ollama: None,
            openai: None,
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llava".to_string(),
        }
    }
}

/// OpenAI-compatible Chat Completions configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL (the `/chat/completions` path is appended)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Synthesis service base URL
    pub endpoint: String,

    /// API key sent as a bearer token, if any (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model identifier passed to the synthesis service
    pub model: String,

    /// Voice for the first attempt
    pub voice: String,

    /// Voice for the single retry
    pub fallback_voice: String,

    /// Rate adjustment, e.g. "+25%"
    pub rate: SpeechRate,

    /// Audio container requested from the service (also the file extension)
    pub format: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5050".to_string(),
            api_key: String::new(),
            model: "tts-1".to_string(),
            voice: "en-US-GuyNeural".to_string(),
            fallback_voice: "en-US-JennyNeural".to_string(),
            rate: SpeechRate::from_percent(25),
            format: "mp3".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
