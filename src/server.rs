//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::error::ProjectError;
use crate::models::AppConfig;
use crate::services::{ProjectService, ProjectStore};

/// Multipart framing on top of the largest accepted image
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<ProjectService>,
}

/// Create application state, opening the projects directory.
pub fn create_app_state(config: AppConfig) -> Result<AppState, ProjectError> {
    let config = Arc::new(config);
    let store = Arc::new(ProjectStore::open(&config.projects_dir)?);
    let service = Arc::new(ProjectService::new(store, config.clone()));

    tracing::info!(
        projects_dir = %config.projects_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        "Project store ready"
    );

    Ok(AppState { config, service })
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + UPLOAD_OVERHEAD_BYTES;

    Router::new()
        // Project CRUD
        .route(
            "/api/projects",
            get(api::list_projects).post(api::create_project),
        )
        .route(
            "/api/projects/:id",
            get(api::get_project).delete(api::delete_project),
        )
        // Artifacts
        .route("/api/projects/:id/images/:filename", get(api::get_image))
        .route("/api/projects/:id/export", get(api::export_project))
        // Processing
        .route("/api/projects/:id/crop", post(api::crop_project))
        .route("/api/projects/:id/fill", post(api::fill_project))
        .route("/api/projects/:id/quantize", post(api::quantize_project))
        .route("/api/projects/:id/palette", put(api::update_palette))
        .route("/api/projects/:id/palette/merge", post(api::merge_palette))
        .route("/api/projects/:id/flip", post(api::flip_project))
        .route("/api/projects/:id/layers", post(api::build_layers))
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state, body limit and tracing
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
