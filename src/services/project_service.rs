//! Project operations: every lifecycle transition and the artifacts it
//! reads, writes and invalidates.
//!
//! Mutating operations hold the project's lock for their whole duration
//! and run their CPU and file work on the blocking pool.

use print_layers::{
    compose, flood_fill, merge_entries, render_labels, replace_palette, Palette, Quantizer,
    Raster, Rgb,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ProjectError;
use crate::models::{
    AppConfig, CropRect, FlipFlags, Invalidation, ProjectId, ProjectRecord, ProjectState,
    Quantization,
};
use crate::rendering::{crop, decode_upload, encode_progression};
use crate::services::exporter::{build_archive, ExportEntry};
use crate::services::project_store::{
    layer_file_name, Artifact, ImageName, ProjectStore, PROGRESSION_FILE,
};

/// Smallest palette a user may request
pub const MIN_COLORS: usize = 2;
/// Largest palette a user may request
pub const MAX_COLORS: usize = 12;
/// Tolerance at which a fill reaches every color (the RGB cube diagonal)
pub const MAX_FILL_TOLERANCE: f64 = 442.0;

pub struct ProjectService {
    store: Arc<ProjectStore>,
    config: Arc<AppConfig>,
}

impl ProjectService {
    pub fn new(store: Arc<ProjectStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Decode an upload and start a new project from it
    pub async fn create(&self, name: String, bytes: Vec<u8>) -> Result<ProjectRecord, ProjectError> {
        if bytes.is_empty() {
            return Err(ProjectError::InvalidUpload("image is empty".into()));
        }
        if bytes.len() > self.config.max_upload_bytes {
            return Err(ProjectError::InvalidUpload(format!(
                "image is {} bytes (max {})",
                bytes.len(),
                self.config.max_upload_bytes
            )));
        }
        let name = match name.trim() {
            "" => "Untitled".to_string(),
            trimmed => trimmed.to_string(),
        };

        let store = self.store.clone();
        let started = Instant::now();
        let record = tokio::task::spawn_blocking(move || {
            let original = decode_upload(&bytes)?;
            let record = ProjectRecord::new(
                ProjectId::generate(),
                name,
                original.width() as u32,
                original.height() as u32,
            );
            store.create(&record, &original)?;
            Ok::<_, ProjectError>(record)
        })
        .await??;

        tracing::info!(
            project = %record.id,
            name = %record.name,
            width = record.width,
            height = record.height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Project created"
        );
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<ProjectRecord>, ProjectError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.list()).await?
    }

    pub async fn get(&self, id: &ProjectId) -> Result<ProjectRecord, ProjectError> {
        let store = self.store.clone();
        let id = id.clone();
        tokio::task::spawn_blocking(move || store.load(&id)).await?
    }

    pub async fn delete(&self, id: &ProjectId) -> Result<(), ProjectError> {
        let _guard = self.store.lock(id).await?;
        self.store.delete(id).await
    }

    /// Crop the original; drops quantization, layers and flips
    pub async fn crop(&self, id: &ProjectId, rect: CropRect) -> Result<ProjectRecord, ProjectError> {
        self.mutate(id, "crop", move |store, record| {
            let invalidation = record.apply_crop(rect)?;
            let original = store.read_raster(&record.id, Artifact::Original)?;
            let cropped = crop(&original, rect)?;

            store.write_raster(&record.id, Artifact::Cropped, &cropped)?;
            Ok(invalidation)
        })
        .await
    }

    /// Repaint the region connected to `(x, y)` in the crop (or the
    /// original) and drop everything derived from it
    pub async fn fill(
        &self,
        id: &ProjectId,
        x: u32,
        y: u32,
        tolerance: f64,
        color: Rgb,
    ) -> Result<ProjectRecord, ProjectError> {
        if !tolerance.is_finite() || !(0.0..=MAX_FILL_TOLERANCE).contains(&tolerance) {
            return Err(ProjectError::InvalidFill(format!(
                "tolerance must be between 0 and {MAX_FILL_TOLERANCE}, got {tolerance}"
            )));
        }

        self.mutate(id, "fill", move |store, record| {
            let (width, height) = record.source_dimensions();
            if x >= width || y >= height {
                return Err(ProjectError::InvalidFill(format!(
                    "point ({x}, {y}) is outside the {width}x{height} image"
                )));
            }
            let artifact = match record.crop {
                Some(_) => Artifact::Cropped,
                None => Artifact::Original,
            };
            let source = store.read_raster(&record.id, artifact)?;
            let filled = flood_fill(&source, x as usize, y as usize, tolerance, color)?;
            tracing::debug!(
                project = %record.id,
                x,
                y,
                tolerance,
                color = %color.to_hex(),
                pixels = filled.pixels,
                "Filled region"
            );

            let invalidation = record.apply_source_edit();
            store.write_raster(&record.id, artifact, &filled.raster)?;
            Ok(invalidation)
        })
        .await
    }

    /// Cluster the crop (or the original) into `color_count` colors
    pub async fn quantize(
        &self,
        id: &ProjectId,
        color_count: usize,
        simplification: u8,
    ) -> Result<ProjectRecord, ProjectError> {
        if !(MIN_COLORS..=MAX_COLORS).contains(&color_count) {
            return Err(ProjectError::ColorCountOutOfRange {
                actual: color_count,
                min: MIN_COLORS,
                max: MAX_COLORS,
            });
        }
        let simplification = simplification.min(100);
        let options = self.config.quantizer.options(simplification);

        self.mutate(id, "quantize", move |store, record| {
            let source = match record.crop {
                Some(_) => store.read_raster(&record.id, Artifact::Cropped)?,
                None => store.read_raster(&record.id, Artifact::Original)?,
            };
            let result = Quantizer::new(options).quantize(&source, color_count)?;
            tracing::debug!(
                project = %record.id,
                pixels = source.len(),
                palette = ?result.palette.colors().iter().map(|c| c.to_hex()).collect::<Vec<_>>(),
                "Quantized"
            );

            let invalidation = record.apply_quantization(Quantization {
                color_count,
                simplification,
                palette: result.palette.to_bytes(),
            });
            store.write_labels(&record.id, &result.labels)?;
            store.write_raster(&record.id, Artifact::Quantized, &result.raster)?;
            write_flipped_preview(store, record, &result.raster)?;
            Ok(invalidation)
        })
        .await
    }

    /// Recolor through the stored label map; never reclusters
    pub async fn replace_palette(
        &self,
        id: &ProjectId,
        colors: Vec<Rgb>,
    ) -> Result<ProjectRecord, ProjectError> {
        self.mutate(id, "replace palette", move |store, record| {
            let current = Palette::from_bytes(&record.require_quantized("replace palette")?.palette)?;
            let replacement = Palette::new(&colors)?;
            let invalidation = record.apply_palette(replacement.to_bytes())?;

            let labels = store.read_labels(&record.id)?;
            let raster = replace_palette(&labels, &current, &replacement)?;

            store.write_raster(&record.id, Artifact::Quantized, &raster)?;
            write_flipped_preview(store, record, &raster)?;
            Ok(invalidation)
        })
        .await
    }

    /// Fold palette entry `remove` into `keep`
    pub async fn merge_palette(
        &self,
        id: &ProjectId,
        keep: usize,
        remove: usize,
    ) -> Result<ProjectRecord, ProjectError> {
        self.mutate(id, "merge palette entries", move |store, record| {
            let palette =
                Palette::from_bytes(&record.require_quantized("merge palette entries")?.palette)?;
            let labels = store.read_labels(&record.id)?;
            let merged = merge_entries(&labels, &palette, keep, remove)?;
            let raster = render_labels(&merged.labels, &merged.palette)?;

            let invalidation = record.apply_merge(merged.palette.to_bytes())?;
            store.write_labels(&record.id, &merged.labels)?;
            store.write_raster(&record.id, Artifact::Quantized, &raster)?;
            write_flipped_preview(store, record, &raster)?;
            Ok(invalidation)
        })
        .await
    }

    /// Set mirror flags; unchanged flags leave the project untouched
    pub async fn flip(&self, id: &ProjectId, flip: FlipFlags) -> Result<ProjectRecord, ProjectError> {
        self.mutate(id, "flip", move |store, record| {
            let Some(invalidation) = record.apply_flip(flip)? else {
                return Ok(Invalidation::default());
            };
            if flip.any() {
                let quantized = store.read_raster(&record.id, Artifact::Quantized)?;
                write_flipped_preview(store, record, &quantized)?;
            }
            Ok(invalidation)
        })
        .await
    }

    /// Resolve the print order and render the full layer set
    pub async fn build_layers(
        &self,
        id: &ProjectId,
        order: Option<Vec<usize>>,
    ) -> Result<ProjectRecord, ProjectError> {
        self.mutate(id, "build layers", move |store, record| {
            let palette = Palette::from_bytes(&record.require_quantized("build layers")?.palette)?;
            let mut labels = store.read_labels(&record.id)?;
            if record.flip.any() {
                labels = labels.flipped(record.flip.horizontal, record.flip.vertical);
            }

            let composition = compose(&palette, &labels, order.as_deref())?;
            let rasters: Vec<Raster> = composition.layers.into_iter().map(|l| l.raster).collect();
            let paper = palette.color(palette.paper_index());
            let progression = encode_progression(&rasters, paper)?;
            store.replace_layers(&record.id, &rasters, &progression)?;
            tracing::debug!(
                project = %record.id,
                order = ?composition.order.as_slice(),
                "Layers rendered"
            );
            record.apply_layers(composition.order.into_vec())?;
            Ok(Invalidation::default())
        })
        .await
    }

    /// Zip of the quantized image, every layer and the progression GIF
    pub async fn export(&self, id: &ProjectId) -> Result<(String, Vec<u8>), ProjectError> {
        let _guard = self.store.lock(id).await?;
        let store = self.store.clone();
        let id = id.clone();
        tokio::task::spawn_blocking(move || {
            let record = store.load(&id)?;
            let layers = match (&record.layers, record.state) {
                (Some(layers), ProjectState::LayersCreated) => layers,
                _ => {
                    return Err(ProjectError::WrongStage {
                        operation: "export",
                        state: record.state,
                    })
                }
            };

            let mut entries = vec![ExportEntry {
                name: Artifact::Quantized.file_name().to_string(),
                source: store.artifact_path(&id, Artifact::Quantized),
            }];
            if record.flip.any() {
                entries.push(ExportEntry {
                    name: Artifact::Flipped.file_name().to_string(),
                    source: store.artifact_path(&id, Artifact::Flipped),
                });
            }
            entries.extend((0..layers.count()).map(|i| ExportEntry {
                name: format!("layers/{}", layer_file_name(i)),
                source: store.layer_path(&id, i),
            }));
            entries.push(ExportEntry {
                name: format!("layers/{PROGRESSION_FILE}"),
                source: store.progression_path(&id),
            });

            let archive = build_archive(&entries)?;
            tracing::info!(project = %id, files = entries.len(), bytes = archive.len(), "Exported project");
            Ok((export_file_name(&record), archive))
        })
        .await?
    }

    /// Path of a stored image, if the project currently has it
    pub async fn image_path(&self, id: &ProjectId, name: &str) -> Result<PathBuf, ProjectError> {
        let image = ImageName::parse(name).ok_or(ProjectError::MissingArtifact("image"))?;
        let record = self.get(id).await?;
        let available = match image {
            ImageName::Artifact(Artifact::Original) => true,
            ImageName::Artifact(Artifact::Cropped) => record.crop.is_some(),
            ImageName::Artifact(Artifact::Quantized) => record.quantization.is_some(),
            ImageName::Artifact(Artifact::Flipped) => {
                record.quantization.is_some() && record.flip.any()
            }
            ImageName::Artifact(Artifact::Labels) => false,
            ImageName::Layer(i) => record.layers.as_ref().is_some_and(|l| i < l.count()),
            ImageName::Progression => record.layers.is_some(),
        };
        if !available {
            return Err(ProjectError::MissingArtifact("image"));
        }
        Ok(self.store.image_path(id, image))
    }

    /// Load, change and persist one project under its lock.
    ///
    /// `f` writes the new artifacts and returns what became stale; stale
    /// files are removed only once the saved record no longer refers to them.
    async fn mutate<F>(
        &self,
        id: &ProjectId,
        operation: &'static str,
        f: F,
    ) -> Result<ProjectRecord, ProjectError>
    where
        F: FnOnce(&ProjectStore, &mut ProjectRecord) -> Result<Invalidation, ProjectError>
            + Send
            + 'static,
    {
        let _guard = self.store.lock(id).await?;
        let store = self.store.clone();
        let id = id.clone();
        let started = Instant::now();

        let record = tokio::task::spawn_blocking(move || {
            let mut record = store.load(&id)?;
            let before = record.clone();
            let invalidation = f(store.as_ref(), &mut record)?;
            if record != before {
                store.save(&record)?;
            }
            if let Err(e) = store.invalidate(&id, invalidation) {
                tracing::warn!(project = %id, %e, "Stale artifacts left behind");
            }
            Ok::<_, ProjectError>(record)
        })
        .await?;

        match &record {
            Ok(record) => tracing::info!(
                project = %record.id,
                operation,
                state = %record.state,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Project updated"
            ),
            Err(e) => tracing::warn!(operation, %e, "Project operation failed"),
        }
        record
    }
}

/// Keep `flipped.png` in step with the quantized image and the flip flags
fn write_flipped_preview(
    store: &ProjectStore,
    record: &ProjectRecord,
    quantized: &Raster,
) -> Result<(), ProjectError> {
    if record.flip.any() {
        let flipped = quantized.flipped(record.flip.horizontal, record.flip.vertical);
        store.write_raster(&record.id, Artifact::Flipped, &flipped)
    } else {
        store.remove_artifact(&record.id, Artifact::Flipped)
    }
}

fn export_file_name(record: &ProjectRecord) -> String {
    let slug: String = record
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format!("{}_layers.zip", record.id)
    } else {
        format!("{slug}_layers.zip")
    }
}
