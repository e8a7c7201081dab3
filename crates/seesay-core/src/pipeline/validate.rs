//! Input validation and stored-file naming.

use chrono::{DateTime, Local};
use std::path::Path;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{file_timestamp, UploadedImage};

/// Validates files before they enter the pipeline.
pub struct Validator {
    allowed_extensions: Vec<String>,
    max_bytes: u64,
}

impl Validator {
    /// Create a validator from the processing and limits config.
    pub fn new(config: &Config) -> Self {
        Self {
            allowed_extensions: config
                .processing
                .allowed_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            max_bytes: config.limits.max_upload_bytes,
        }
    }

    /// True iff the filename has an extension in the allow-set.
    pub fn allowed_file(&self, filename: &str) -> bool {
        extension(filename)
            .map(|ext| self.allowed_extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }

    /// Check a client-supplied filename, returning its lowercase extension.
    pub fn check_filename(&self, filename: &str) -> PipelineResult<String> {
        if filename.is_empty() {
            return Err(PipelineError::EmptyFilename);
        }
        match extension(filename) {
            Some(ext) if self.allowed_file(filename) => Ok(ext),
            _ => Err(PipelineError::UnsupportedFormat {
                filename: filename.to_string(),
            }),
        }
    }

    /// Check a payload size against the upload limit.
    pub fn check_size(&self, size: u64) -> PipelineResult<()> {
        if size > self.max_bytes {
            return Err(PipelineError::FileTooLarge {
                size: Some(size),
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Validate an uploaded image, returning its lowercase extension.
    pub fn validate_upload(&self, upload: &UploadedImage) -> PipelineResult<String> {
        let ext = self.check_filename(&upload.filename)?;
        self.check_size(upload.bytes.len() as u64)?;
        Ok(ext)
    }

    /// Validate a local file for the CLI, returning its lowercase extension.
    ///
    /// Checks that the file exists, has an allowed extension and is within
    /// the size limit.
    pub fn validate_path(&self, path: &Path) -> PipelineResult<String> {
        if !path.is_file() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self.check_filename(&filename)?;

        let metadata =
            std::fs::metadata(path).map_err(|e| PipelineError::filesystem(path, e))?;
        self.check_size(metadata.len())?;

        Ok(ext)
    }
}

/// Lowercase extension after the last dot, if any.
fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Reduce a filename stem to a safe ASCII form.
///
/// Path separators and whitespace become `_`, anything outside
/// `[A-Za-z0-9_.-]` is dropped, and leading/trailing `.`/`_` are trimmed so
/// the result can never climb out of the upload directory.
fn secure_stem(stem: &str) -> String {
    let spaced: String = stem
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Generate the stored name for an accepted upload:
/// `<sanitized stem>_<YYYYmmdd_HHMMSS>.<ext>`.
pub fn secure_filename_with_timestamp(filename: &str, now: DateTime<Local>) -> String {
    let (stem, ext) = filename.rsplit_once('.').unwrap_or((filename, ""));
    let stamp = file_timestamp(now);
    let ext = secure_stem(&ext.to_lowercase());
    format!("{}_{stamp}.{ext}", secure_stem(stem))
}
