//! Image upload service that forwards face-swap and prompt-generation
//! requests to a hosted Gemini model and echoes the input image back with
//! the model's analysis attached.

pub mod config;
pub mod error;
pub mod feature;
pub mod gemini;
pub mod handlers;
pub mod quality;
pub mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::feature::ModelNames;
use crate::gemini::ModelClient;
use crate::upload::MAX_FILE_SIZE;

/// Room for two full-size images plus form overhead.
pub const MAX_REQUEST_BYTES: usize = 2 * MAX_FILE_SIZE + 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelClient>,
    pub models: ModelNames,
}

impl AppState {
    pub fn new(model: Arc<dyn ModelClient>, models: ModelNames) -> Self {
        Self { model, models }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/face-swap", post(handlers::face_swap))
        .route("/api/prompt-generation", post(handlers::prompt_generation))
        .route("/api/image-quality", post(handlers::image_quality))
        .route("/api/prompt-templates", get(handlers::prompt_templates))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
