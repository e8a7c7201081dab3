//! Route handlers.

use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use minijinja::context;
use seesay_core::error::display_size;
use seesay_core::{Narration, PipelineError, UploadedImage};
use serde::Serialize;

use super::error::ApiError;
use super::AppState;

/// Body of a successful `POST /api/describe`.
#[derive(Debug, Serialize)]
pub struct DescribeResponse {
    pub success: bool,
    pub description: String,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
}

impl From<Narration> for DescribeResponse {
    fn from(narration: Narration) -> Self {
        Self {
            success: true,
            image_url: narration
                .image
                .map(|image| format!("/static/uploads/{}", image.file_name)),
            audio_url: Some(format!("/audio/{}", narration.audio.file_name)),
            description: narration.description,
        }
    }
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    state
        .render(context! {
            max_upload => display_size(state.max_upload_bytes),
        })
        .map(Html)
}

/// `POST /` - describe an upload and render the result page.
pub async fn index_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let narration = describe_upload(&state, multipart)
        .await
        .map_err(ApiError::for_form)?;

    let image = narration
        .image
        .as_ref()
        .map(|image| format!("uploads/{}", image.file_name));
    state
        .render(context! {
            description => narration.description,
            image => image,
            audio => narration.audio.file_name,
            max_upload => display_size(state.max_upload_bytes),
        })
        .map(Html)
        .map_err(ApiError::for_form)
}

/// `POST /api/describe`
pub async fn api_describe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DescribeResponse>, ApiError> {
    let narration = describe_upload(&state, multipart).await?;
    Ok(Json(narration.into()))
}

/// `GET /audio/{filename}` - the audio file as an attachment.
pub async fn download_audio(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if !is_plain_file_name(&filename) {
        return Err(ApiError::NotFound("Audio file not found"));
    }
    let path = state.audio_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Audio file not found"));
        }
        Err(e) => return Err(PipelineError::filesystem(&path, e).into()),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Page not found")
}

/// Pull the `image` part out of the form and run it through the pipeline.
async fn describe_upload(state: &AppState, multipart: Multipart) -> Result<Narration, ApiError> {
    let upload = read_image_field(state, multipart).await?;
    Ok(state.narrator.narrate_upload(&upload).await?)
}

async fn read_image_field(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadedImage, ApiError> {
    let max = state.max_upload_bytes;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart(e, max))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        // Reject by name before buffering the body
        state.narrator.validator().check_filename(&filename)?;

        let content_type = field.content_type().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::from_multipart(e, max))?;
        return Ok(UploadedImage {
            bytes: bytes.to_vec(),
            filename,
            content_type,
        });
    }
    Err(PipelineError::NoFile.into())
}

/// True for a bare file name with no directory components.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && FsPath::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}
