//! HTTP error responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use seesay_core::{ErrorKind, PipelineError};
use serde_json::json;
use thiserror::Error;

/// Shown by the HTML form route in place of internal failure details.
pub const FORM_FAILURE: &str = "Error processing image. Please try again.";

/// Errors returned by route handlers, rendered as JSON `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A pipeline stage failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The multipart body could not be read
    #[error("Invalid upload: {0}")]
    Malformed(String),

    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(&'static str),

    /// Internal failure with a fixed client-facing message
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl ApiError {
    /// Translate a multipart read failure. Body-limit breaches become
    /// `FileTooLarge`.
    pub fn from_multipart(e: MultipartError, max_upload_bytes: u64) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::Pipeline(PipelineError::FileTooLarge {
                size: None,
                max_bytes: max_upload_bytes,
            });
        }
        ApiError::Malformed(e.body_text())
    }

    /// Hide the details of server-side failures behind the form message.
    /// Client errors pass through unchanged.
    pub fn for_form(self) -> Self {
        if self.status_code().is_server_error() {
            ApiError::Internal {
                message: FORM_FAILURE.to_string(),
                detail: self.to_string(),
            }
        } else {
            self
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(e) => match (e.kind(), e) {
                (_, PipelineError::FileTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
                (_, PipelineError::FileNotFound(_)) => StatusCode::NOT_FOUND,
                (ErrorKind::InputRejected, _) => StatusCode::BAD_REQUEST,
                (ErrorKind::UpstreamFailure, _)
                | (ErrorKind::ArtifactMissing, _)
                | (ErrorKind::FilesystemFailure, _) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { detail, .. } => {
                tracing::error!("Internal service error: {detail}");
            }
            ApiError::Pipeline(e) if e.kind() != ErrorKind::InputRejected => {
                tracing::error!("Pipeline error: {e}");
            }
            _ => tracing::debug!("Client error: {self}"),
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
