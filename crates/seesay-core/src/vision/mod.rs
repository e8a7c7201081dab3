//! Vision-language integration for image descriptions.
//!
//! Provides a provider abstraction over Ollama and OpenAI-compatible
//! backends, and the `Describer` that applies deadlines and the
//! empty-response fallback on top of it.

pub(crate) mod describer;
pub(crate) mod ollama;
pub(crate) mod openai;
pub(crate) mod provider;

pub use describer::{Describer, FALLBACK_DESCRIPTION};
pub use provider::{
    ImageInput, VisionProvider, VisionProviderFactory, VisionRequest, VisionResponse,
    SYSTEM_PROMPT, USER_PROMPT,
};
