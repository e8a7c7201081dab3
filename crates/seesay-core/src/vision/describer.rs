//! Image description on top of a vision provider.
//!
//! Adds the per-call deadline and the empty-response substitution. Failures
//! are returned as-is; whether to retry is the caller's decision.

use super::provider::{ImageInput, VisionProvider, VisionRequest};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use std::sync::Arc;

/// Sentence returned when the model produced no text.
pub const FALLBACK_DESCRIPTION: &str = "Unable to generate description for this image.";

/// Produces short objective descriptions of images.
pub struct Describer {
    provider: Arc<dyn VisionProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl Describer {
    pub fn new(provider: Box<dyn VisionProvider>, config: &Config) -> Self {
        Self {
            provider: Arc::from(provider),
            temperature: config.vision.temperature,
            max_tokens: config.vision.max_tokens,
        }
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Whether the underlying provider answers a health check.
    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }

    /// Describe an image given its bytes and format (file extension).
    pub async fn describe(&self, bytes: &[u8], format: &str) -> PipelineResult<String> {
        let image = ImageInput::from_bytes(bytes, format);
        let request = VisionRequest::describe_image(image, self.temperature, self.max_tokens);
        let timeout = self.provider.timeout();

        let response = match tokio::time::timeout(timeout, self.provider.generate(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(provider = self.provider.name(), "Vision call failed: {e}");
                return Err(e);
            }
            Err(_) => {
                tracing::error!(provider = self.provider.name(), "Vision call timed out");
                return Err(PipelineError::Timeout {
                    stage: "vision".to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
        };

        if response.text.trim().is_empty() {
            tracing::warn!("Empty description returned from model {}", response.model);
            return Ok(FALLBACK_DESCRIPTION.to_string());
        }

        tracing::info!(
            model = %response.model,
            latency_ms = response.latency_ms,
            "Generated image description"
        );
        Ok(response.text)
    }
}
