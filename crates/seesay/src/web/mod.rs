//! Web interface: HTML upload form, JSON API, audio downloads.

mod error;
mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use minijinja::Environment;
use seesay_core::{Config, Narrator};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Headroom for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    narrator: Arc<Narrator>,
    templates: Arc<Environment<'static>>,
    audio_dir: PathBuf,
    max_upload_bytes: u64,
}

impl AppState {
    pub fn new(narrator: Arc<Narrator>, config: &Config) -> anyhow::Result<Self> {
        let mut templates = Environment::new();
        templates.add_template("index.html", include_str!("templates/index.html"))?;
        Ok(Self {
            narrator,
            templates: Arc::new(templates),
            audio_dir: config.audio_dir(),
            max_upload_bytes: config.limits.max_upload_bytes,
        })
    }

    fn render(&self, ctx: minijinja::Value) -> Result<String, ApiError> {
        self.templates
            .get_template("index.html")
            .and_then(|template| template.render(ctx))
            .map_err(|e| ApiError::Internal {
                message: "Internal server error".to_string(),
                detail: format!("template error: {e}"),
            })
    }
}

/// Build the application router.
pub fn router(state: AppState, config: &Config) -> Router {
    let body_limit = usize::try_from(config.limits.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(handlers::index).post(handlers::index_upload))
        .route("/api/describe", post(handlers::api_describe))
        .route("/audio/{filename}", get(handlers::download_audio))
        .nest_service("/static/uploads", ServeDir::new(config.upload_dir()))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
