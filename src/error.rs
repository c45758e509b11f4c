use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use print_layers::EngineError;
use serde_json::json;
use thiserror::Error;

use crate::models::ProjectState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Project(#[from] ProjectError),
}

/// Failures of project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Operation '{operation}' is not allowed in state {state}")]
    WrongStage {
        operation: &'static str,
        state: ProjectState,
    },

    #[error("Missing artifact: {0}")]
    MissingArtifact(&'static str),

    #[error("color_count must be between {min} and {max}, got {actual}")]
    ColorCountOutOfRange {
        actual: usize,
        min: usize,
        max: usize,
    },

    #[error("Palette must have {expected} colors, got {actual}")]
    PaletteLength { expected: usize, actual: usize },

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid fill: {0}")]
    InvalidFill(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<print_layers::PaletteError> for ProjectError {
    fn from(e: print_layers::PaletteError) -> Self {
        ProjectError::Engine(e.into())
    }
}

impl From<print_layers::RasterError> for ProjectError {
    fn from(e: print_layers::RasterError) -> Self {
        ProjectError::Engine(e.into())
    }
}

impl From<tokio::task::JoinError> for ProjectError {
    fn from(e: tokio::task::JoinError) -> Self {
        ProjectError::Task(e.to_string())
    }
}

impl ProjectError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProjectError::NotFound(_) => StatusCode::NOT_FOUND,
            ProjectError::WrongStage { .. }
            | ProjectError::MissingArtifact(_)
            | ProjectError::ColorCountOutOfRange { .. }
            | ProjectError::PaletteLength { .. }
            | ProjectError::InvalidCrop(_)
            | ProjectError::InvalidUpload(_)
            | ProjectError::InvalidFill(_) => StatusCode::BAD_REQUEST,
            // Stored label maps that no longer fit their palette are corrupt data, not bad input
            ProjectError::Engine(EngineError::Raster(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ProjectError::Engine(_) => StatusCode::BAD_REQUEST,
            ProjectError::Image(_)
            | ProjectError::PngEncode(_)
            | ProjectError::Zip(_)
            | ProjectError::Json(_)
            | ProjectError::Io(_)
            | ProjectError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Project(e) => e.status(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
