use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use utoipa::ToSchema;

use crate::error::{ApiError, ProjectError};
use crate::models::{ProjectDetail, ProjectId, ProjectSummary};
use crate::server::AppState;

/// Multipart form for project upload
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// Display name for the project
    pub name: Option<String>,
    /// Photograph to reduce (PNG, JPEG, ...)
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Parse a path id; malformed ids cannot name any project
pub(crate) fn parse_id(id: &str) -> Result<ProjectId, ApiError> {
    ProjectId::parse(id).ok_or_else(|| ProjectError::NotFound(id.to_string()).into())
}

/// List projects
///
/// Oldest first.
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "All projects", body = Vec<ProjectSummary>),
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let records = state.service.list().await?;
    Ok(Json(records.iter().map(ProjectSummary::from).collect()))
}

/// Create a project from an uploaded photograph
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Project created", body = ProjectDetail),
        (status = 400, description = "Missing or undecodable image"),
    ),
    tag = "Projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut name = String::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("name") => {
                name = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            }
            Some("image") | Some("file") => {
                if name.is_empty() {
                    if let Some(file_name) = field.file_name() {
                        name = file_stem(file_name).to_string();
                    }
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                image = Some(bytes.to_vec());
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("missing 'image' field".into()))?;
    let record = state.service.create(name, image).await?;
    Ok((StatusCode::CREATED, Json(ProjectDetail::from(&record))).into_response())
}

fn file_stem(file_name: &str) -> &str {
    std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Get project details
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    responses(
        (status = 200, description = "Project details", body = ProjectDetail),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let id = parse_id(&id)?;
    let record = state.service.get(&id).await?;
    Ok(Json(ProjectDetail::from(&record)))
}

/// Delete a project and all its artifacts
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Projects"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a stored image
///
/// Known names: `original.png`, `cropped.png`, `quantized.png`,
/// `flipped.png`, `layer_<i>.png` and the animated `progression.gif`.
#[utoipa::path(
    get,
    path = "/api/projects/{id}/images/{filename}",
    responses(
        (status = 200, description = "PNG image, or GIF for the progression", content_type = "image/png"),
        (status = 404, description = "Unknown project or image"),
    ),
    params(
        ("id" = String, Path, description = "Project id"),
        ("filename" = String, Path, description = "Image file name"),
    ),
    tag = "Projects"
)]
pub async fn get_image(
    State(state): State<AppState>,
    Path((id, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let path = match state.service.image_path(&id, &filename).await {
        Ok(path) => path,
        Err(ProjectError::MissingArtifact(_)) => return Err(ApiError::NotFound),
        Err(e) => return Err(e.into()),
    };
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ApiError::NotFound),
        Err(e) => return Err(ProjectError::Io(e).into()),
    };

    let content_type = if filename.ends_with(".gif") {
        "image/gif"
    } else {
        "image/png"
    };
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "no-store"),
        ],
        bytes,
    )
        .into_response())
}

/// Download the quantized image and all layers as a zip
#[utoipa::path(
    get,
    path = "/api/projects/{id}/export",
    responses(
        (status = 200, description = "Zip archive", content_type = "application/zip"),
        (status = 400, description = "Layers not built yet"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Projects"
)]
pub async fn export_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let (file_name, archive) = state.service.export(&id).await?;
    let disposition = format!("attachment; filename=\"{file_name}\"");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("birch.jpg"), "birch");
        assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_parse_id_rejects_malformed() {
        assert!(parse_id("../../etc").is_err());
        let id = ProjectId::generate();
        assert_eq!(parse_id(id.as_str()).unwrap(), id);
    }
}
