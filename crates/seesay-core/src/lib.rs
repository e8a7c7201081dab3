//! Seesay Core - image description and narration library.
//!
//! Seesay takes an image, asks a vision-language model for a short objective
//! description, and turns that description into a spoken audio file.
//!
//! # Architecture
//!
//! ```text
//! Image → Validate → Describe (vision model) → Speak (TTS, fallback voice) → Narration
//! ```
//!
//! Transports (the HTTP server and the CLI in the `seesay` crate) sit on top
//! of [`Narrator`] and decide how errors are presented from
//! [`PipelineError::kind`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use seesay_core::{Config, Narrator};
//!
//! #[tokio::main]
//! async fn main() -> seesay_core::Result<()> {
//!     let config = Config::load()?;
//!     config.ensure_dirs()?;
//!     let narrator = Narrator::from_config(&config, None)?;
//!
//!     let narration = narrator.narrate_file("./mug.jpg".as_ref()).await?;
//!     println!("{}", narration.description);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod housekeeping;
pub mod pipeline;
pub mod speech;
pub mod storage;
pub mod types;
pub mod vision;

pub use config::Config;
pub use error::{ConfigError, ErrorKind, PipelineError, PipelineResult, Result, SeesayError};
pub use housekeeping::{cleanup_old_files, CleanupReport};
pub use pipeline::{Narrator, Validator};
pub use speech::{SpeechRate, SpeechSynthesizer};
pub use types::{AudioArtifact, Narration, StoredImage, UploadedImage};
pub use vision::{Describer, FALLBACK_DESCRIPTION};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
