//! Vision provider trait and request/response types.
//!
//! Defines the interface that all vision-language backends implement, plus
//! the factory that picks one from config and CLI flags.

use crate::config::{resolve_env_var, Config, OllamaConfig, OpenAiConfig};
use crate::error::PipelineError;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Instruction given to the model as the system message.
pub const SYSTEM_PROMPT: &str = "You are a visual assistant for blind users. Describe only:
- Clearly visible objects and text
- Colors and basic shapes
- People's appearance (clothing, hair)
- Spatial relationships
No speculation, emotions, or metaphors. 2-3 phrases under 60 words.";

/// Instruction sent alongside the image.
pub const USER_PROMPT: &str = "List objective observations about this image.";

/// Base64-encoded image ready to send to a vision API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the file extension or format name ("jpeg", "png", ...).
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A request to describe one image.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// The image to describe
    pub image: ImageInput,
    /// System instruction
    pub system_prompt: String,
    /// User instruction sent with the image
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl VisionRequest {
    /// Build the standard objective-description request.
    pub fn describe_image(image: ImageInput, temperature: f32, max_tokens: u32) -> Self {
        Self {
            image,
            system_prompt: SYSTEM_PROMPT.to_string(),
            prompt: USER_PROMPT.to_string(),
            max_tokens,
            temperature,
        }
    }
}

/// The response from a vision call.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// Generated text, trimmed; may be empty
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn VisionProvider>` for dynamic dispatch).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "ollama", "openai").
    fn name(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Generate text for the given request.
    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, PipelineError>;

    /// Per-request deadline for this provider.
    fn timeout(&self) -> Duration;
}

/// Factory that creates the configured provider.
pub struct VisionProviderFactory;

impl VisionProviderFactory {
    /// Create a vision provider from config, with an optional model override.
    pub fn create(
        config: &Config,
        model_override: Option<&str>,
    ) -> Result<Box<dyn VisionProvider>, PipelineError> {
        let timeout = Duration::from_millis(config.limits.vision_timeout_ms);
        match config.vision.provider.as_str() {
            "ollama" => {
                let cfg = config.vision.ollama.clone().unwrap_or_else(OllamaConfig::default);
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    &model,
                    timeout,
                )))
            }
            "openai" => {
                let cfg = config.vision.openai.clone().unwrap_or_else(OpenAiConfig::default);
                let api_key =
                    resolve_env_var(&cfg.api_key).ok_or_else(|| PipelineError::Vision {
                        message: "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                        status_code: None,
                    })?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &model,
                    timeout,
                )))
            }
            other => Err(PipelineError::Vision {
                message: format!("Unknown vision provider: {other}"),
                status_code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_input_from_bytes_jpeg() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "jpg");
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(input.data, "/9j/");
    }

    #[test]
    fn test_image_input_uppercase_format() {
        let input = ImageInput::from_bytes(&[0x89, 0x50, 0x4E, 0x47], "PNG");
        assert_eq!(input.media_type, "image/png");
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "webp");
        assert!(input.data_url().starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn test_describe_request_carries_fixed_instructions() {
        let image = ImageInput::from_bytes(&[1, 2, 3], "jpeg");
        let request = VisionRequest::describe_image(image, 0.1, 150);
        assert!(request.system_prompt.contains("No speculation"));
        assert!(request.system_prompt.contains("under 60 words"));
        assert_eq!(request.prompt, "List objective observations about this image.");
        assert_eq!(request.max_tokens, 150);
    }

    #[test]
    fn test_factory_defaults_to_ollama() {
        let provider = VisionProviderFactory::create(&Config::default(), None).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let mut config = Config::default();
        config.vision.provider = "mystery".into();
        let err = VisionProviderFactory::create(&config, None).err().unwrap();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn test_factory_openai_requires_key() {
        let mut config = Config::default();
        config.vision.provider = "openai".into();
        config.vision.openai = Some(OpenAiConfig {
            api_key: "${SEESAY_TEST_KEY_THAT_IS_NOT_SET}".into(),
            ..OpenAiConfig::default()
        });
        assert!(VisionProviderFactory::create(&config, None).is_err());

        config.vision.openai = Some(OpenAiConfig {
            api_key: "sk-inline".into(),
            ..OpenAiConfig::default()
        });
        let provider = VisionProviderFactory::create(&config, Some("gpt-4o")).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
