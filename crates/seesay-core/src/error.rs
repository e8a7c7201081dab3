//! Error types for the seesay narration pipeline.
//!
//! Errors are organized by stage so callers get actionable messages that
//! carry the relevant context (file names, stage, upstream status code).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for seesay operations.
#[derive(Error, Debug)]
pub enum SeesayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Coarse classification of pipeline failures.
///
/// Transports (HTTP, CLI) decide status codes and exit behaviour from the
/// kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing file, disallowed extension, oversized payload.
    InputRejected,
    /// Vision or speech endpoint error, timeout or unusable response.
    UpstreamFailure,
    /// Synthesis reported success but the output file is absent.
    ArtifactMissing,
    /// Reading, writing or deleting a local file failed.
    FilesystemFailure,
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The request carried no image part
    #[error("No file uploaded")]
    NoFile,

    /// The image part had an empty filename
    #[error("No file selected")]
    EmptyFilename,

    /// Extension missing or outside the allow-set
    #[error("File type not allowed. Please upload an image.")]
    UnsupportedFormat { filename: String },

    /// Upload or input file exceeds the size limit
    #[error("File too large. Maximum size is {}.", display_size(*max_bytes))]
    FileTooLarge { size: Option<u64>, max_bytes: u64 },

    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Vision endpoint failed
    #[error("Vision error: {message}")]
    Vision {
        message: String,
        status_code: Option<u16>,
    },

    /// Speech endpoint failed
    #[error("Speech error with voice {voice}: {message}")]
    Speech {
        voice: String,
        message: String,
        status_code: Option<u16>,
    },

    /// External call exceeded its deadline
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// Synthesis returned without producing its output file
    #[error("Audio file was not created: {0}")]
    ArtifactMissing(PathBuf),

    /// Local filesystem operation failed
    #[error("Filesystem error for {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NoFile
            | PipelineError::EmptyFilename
            | PipelineError::UnsupportedFormat { .. }
            | PipelineError::FileTooLarge { .. }
            | PipelineError::FileNotFound(_) => ErrorKind::InputRejected,
            PipelineError::Vision { .. }
            | PipelineError::Speech { .. }
            | PipelineError::Timeout { .. } => ErrorKind::UpstreamFailure,
            PipelineError::ArtifactMissing(_) => ErrorKind::ArtifactMissing,
            PipelineError::Filesystem { .. } => ErrorKind::FilesystemFailure,
        }
    }

    /// Wrap an I/O error with the path it concerns.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for seesay results.
pub type Result<T> = std::result::Result<T, SeesayError>;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Render a byte count the way limits are quoted to users: `16MB`, `512KB`.
pub fn display_size(bytes: u64) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else if bytes >= KIB {
        format!("{:.1}KB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
