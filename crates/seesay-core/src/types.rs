//! Core data types flowing through the narration pipeline.

use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Second-resolution stamp used in generated file names.
pub(crate) fn file_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// An image received over HTTP, not yet validated or stored.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Raw file bytes
    pub bytes: Vec<u8>,
    /// Filename as sent by the client
    pub filename: String,
    /// Declared content type, if the client sent one
    pub content_type: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_type: None,
        }
    }
}

/// An image persisted to the upload directory under a generated name.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Full path on disk
    pub path: PathBuf,
    /// Generated file name (sanitized and timestamped)
    pub file_name: String,
}

/// A generated audio file.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// Full path on disk
    pub path: PathBuf,
    /// File name within the audio directory
    pub file_name: String,
    /// Voice that produced the audio
    pub voice: String,
    /// Whether the fallback voice was needed
    pub fallback: bool,
}

/// Result of running one image through the pipeline.
#[derive(Debug, Clone)]
pub struct Narration {
    /// Description text that was spoken
    pub description: String,
    /// Stored copy of the upload (web requests only)
    pub image: Option<StoredImage>,
    /// Spoken description
    pub audio: AudioArtifact,
}
