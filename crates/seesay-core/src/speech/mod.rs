//! Text-to-speech for generated descriptions.
//!
//! A `SpeechBackend` talks to a synthesis service; the `SpeechSynthesizer`
//! names output files, enforces the per-attempt deadline, verifies the file
//! was written and owns the fallback-voice retry.

pub(crate) mod backend;
pub(crate) mod http;
mod rate;
pub(crate) mod synthesizer;

pub use backend::{SpeechBackend, SynthesisRequest};
pub use http::HttpSpeechBackend;
pub use rate::SpeechRate;
pub use synthesizer::SpeechSynthesizer;
