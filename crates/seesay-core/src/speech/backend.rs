//! Speech backend trait and request type.

use crate::error::PipelineError;
use async_trait::async_trait;
use std::path::Path;

use super::SpeechRate;

/// Text plus voice parameters for one synthesis call.
///
/// Immutable once built; the fallback attempt derives a new request with
/// [`SynthesisRequest::with_voice`].
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    text: String,
    voice: String,
    rate: SpeechRate,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>, rate: SpeechRate) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            rate,
        }
    }

    /// Same text and rate, different voice.
    pub fn with_voice(&self, voice: impl Into<String>) -> Self {
        Self {
            text: self.text.clone(),
            voice: voice.into(),
            rate: self.rate,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn rate(&self) -> SpeechRate {
        self.rate
    }
}

/// Trait that all speech synthesis services implement.
///
/// Uses `async_trait` so the synthesizer can hold `Arc<dyn SpeechBackend>`.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Synthesize `request` and write the audio stream to `output`.
    ///
    /// `output` already exists, empty, and belongs to this call alone.
    /// Returning `Ok` does not by itself mean audio was written; the
    /// synthesizer checks that separately.
    async fn synthesize(&self, request: &SynthesisRequest, output: &Path)
        -> Result<(), PipelineError>;
}
