use axum::{
    extract::{Path, State},
    response::Json,
};
use print_layers::Rgb;
use serde::Deserialize;
use utoipa::ToSchema;

use super::projects::parse_id;
use crate::error::ApiError;
use crate::models::{CropRect, FlipFlags, ProjectDetail};
use crate::server::AppState;

/// Request body for quantization
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuantizeRequest {
    /// Palette size including the paper white, 2 to 12
    pub color_count: usize,
    /// Speckle removal strength, 0 (off) to 100
    #[serde(default)]
    pub simplification: u8,
}

/// A palette color as `[R, G, B]` or a `#rrggbb` / `#rgb` string
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ColorInput {
    Triple(Vec<u8>),
    Hex(String),
}

impl ColorInput {
    fn to_rgb(&self) -> Result<Rgb, ApiError> {
        match self {
            ColorInput::Triple(bytes) => match bytes.as_slice() {
                &[r, g, b] => Ok(Rgb::new(r, g, b)),
                _ => Err(ApiError::BadRequest(format!(
                    "color must have 3 channels, got {}",
                    bytes.len()
                ))),
            },
            ColorInput::Hex(hex) => hex
                .parse()
                .map_err(|e| ApiError::BadRequest(format!("invalid color '{hex}': {e}"))),
        }
    }
}

/// Request body for palette replacement
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaletteUpdateRequest {
    /// New colors, same length and slot order as the current palette
    pub palette: Vec<ColorInput>,
}

/// Request body for merging two palette entries
#[derive(Debug, Deserialize, ToSchema)]
pub struct MergeRequest {
    /// Entry that survives and absorbs the other's pixels
    pub keep: usize,
    /// Entry that disappears; must not be the paper white
    pub remove: usize,
}

fn default_fill_tolerance() -> f64 {
    32.0
}

/// Request body for a background fill
#[derive(Debug, Deserialize, ToSchema)]
pub struct FillRequest {
    /// Seed column in the crop (or original) image
    pub x: u32,
    /// Seed row in the crop (or original) image
    pub y: u32,
    /// Largest RGB distance from the seed color that still gets filled
    #[serde(default = "default_fill_tolerance")]
    pub tolerance: f64,
    /// Fill color; paper white when omitted
    #[serde(default)]
    pub color: Option<ColorInput>,
}

/// Request body for layer building
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LayerRequest {
    /// Palette indices, first pass first; white is always moved last
    #[serde(default)]
    pub order: Option<Vec<usize>>,
}

/// Crop the original image
///
/// Discards any quantization, layers and flips.
#[utoipa::path(
    post,
    path = "/api/projects/{id}/crop",
    request_body = CropRect,
    responses(
        (status = 200, description = "Cropped", body = ProjectDetail),
        (status = 400, description = "Crop rectangle outside the image"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Processing"
)]
pub async fn crop_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(rect): Json<CropRect>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let id = parse_id(&id)?;
    let record = state.service.crop(&id, rect).await?;
    Ok(Json(ProjectDetail::from(&record)))
}

/// Flood-fill a background region
///
/// Repaints the 4-connected region around the seed that lies within
/// `tolerance` of the seed color. Discards any quantization, layers and
/// flips; a crop is kept and the fill applies to it.
#[utoipa::path(
    post,
    path = "/api/projects/{id}/fill",
    request_body = FillRequest,
    responses(
        (status = 200, description = "Filled", body = ProjectDetail),
        (status = 400, description = "Seed outside the image or tolerance out of range"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Processing"
)]
pub async fn fill_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FillRequest>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let id = parse_id(&id)?;
    let color = match &req.color {
        Some(color) => color.to_rgb()?,
        None => Rgb::WHITE,
    };
    let record = state
        .service
        .fill(&id, req.x, req.y, req.tolerance, color)
        .await?;
    Ok(Json(ProjectDetail::from(&record)))
}

/// Reduce the image to a palette of flat colors
#[utoipa::path(
    post,
    path = "/api/projects/{id}/quantize",
    request_body = QuantizeRequest,
    responses(
        (status = 200, description = "Quantized", body = ProjectDetail),
        (status = 400, description = "color_count out of range"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Processing"
)]
pub async fn quantize_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<QuantizeRequest>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let id = parse_id(&id)?;
    let record = state
        .service
        .quantize(&id, req.color_count, req.simplification)
        .await?;
    Ok(Json(ProjectDetail::from(&record)))
}

/// Replace palette colors
///
/// Pixels keep their palette slot; only the colors change.
#[utoipa::path(
    put,
    path = "/api/projects/{id}/palette",
    request_body = PaletteUpdateRequest,
    responses(
        (status = 200, description = "Palette replaced", body = ProjectDetail),
        (status = 400, description = "Not quantized or wrong palette length"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Processing"
)]
pub async fn update_palette(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PaletteUpdateRequest>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let id = parse_id(&id)?;
    let colors = req
        .palette
        .iter()
        .map(ColorInput::to_rgb)
        .collect::<Result<Vec<_>, _>>()?;
    let record = state.service.replace_palette(&id, colors).await?;
    Ok(Json(ProjectDetail::from(&record)))
}

/// Merge one palette entry into another
#[utoipa::path(
    post,
    path = "/api/projects/{id}/palette/merge",
    request_body = MergeRequest,
    responses(
        (status = 200, description = "Entries merged", body = ProjectDetail),
        (status = 400, description = "Invalid indices or paper entry"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Processing"
)]
pub async fn merge_palette(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let id = parse_id(&id)?;
    let record = state.service.merge_palette(&id, req.keep, req.remove).await?;
    Ok(Json(ProjectDetail::from(&record)))
}

/// Set mirror flags for printing
#[utoipa::path(
    post,
    path = "/api/projects/{id}/flip",
    request_body = FlipFlags,
    responses(
        (status = 200, description = "Flags applied", body = ProjectDetail),
        (status = 400, description = "Not quantized"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Processing"
)]
pub async fn flip_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(flip): Json<FlipFlags>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let id = parse_id(&id)?;
    let record = state.service.flip(&id, flip).await?;
    Ok(Json(ProjectDetail::from(&record)))
}

/// Build the cumulative print layers
#[utoipa::path(
    post,
    path = "/api/projects/{id}/layers",
    request_body(content = LayerRequest, description = "Optional; omit for the default order"),
    responses(
        (status = 200, description = "Layers built", body = ProjectDetail),
        (status = 400, description = "Not quantized or invalid order"),
        (status = 404, description = "Project not found"),
    ),
    params(("id" = String, Path, description = "Project id")),
    tag = "Processing"
)]
pub async fn build_layers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Option<Json<LayerRequest>>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let id = parse_id(&id)?;
    let order = req.and_then(|Json(req)| req.order);
    let record = state.service.build_layers(&id, order).await?;
    Ok(Json(ProjectDetail::from(&record)))
}
