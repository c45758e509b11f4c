use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::ProjectError;

/// Project identifier: 32 lowercase hex characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Generate a fresh id with 128 bits of entropy
    pub fn generate() -> Self {
        use rand::Rng;
        Self(format!("{:032x}", rand::thread_rng().gen::<u128>()))
    }

    /// Accept only well-formed ids, so an id can never escape the projects directory
    pub fn parse(s: &str) -> Option<Self> {
        let valid = s.len() == 32 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        valid.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle tag naming the most advanced artifact currently valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Uploaded,
    Cropped,
    Quantized,
    LayersCreated,
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectState::Uploaded => write!(f, "uploaded"),
            ProjectState::Cropped => write!(f, "cropped"),
            ProjectState::Quantized => write!(f, "quantized"),
            ProjectState::LayersCreated => write!(f, "layers_created"),
        }
    }
}

/// Crop rectangle in original-image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Check the rectangle is non-empty and fits inside `width` x `height`
    pub fn validate(&self, width: u32, height: u32) -> Result<(), ProjectError> {
        if self.width == 0 || self.height == 0 {
            return Err(ProjectError::InvalidCrop("crop area is empty".into()));
        }
        let right = self.x as u64 + self.width as u64;
        let bottom = self.y as u64 + self.height as u64;
        if right > width as u64 || bottom > height as u64 {
            return Err(ProjectError::InvalidCrop(format!(
                "crop {}x{}+{}+{} exceeds image {}x{}",
                self.width, self.height, self.x, self.y, width, height
            )));
        }
        Ok(())
    }
}

/// Mirror flags applied to the quantized image and its layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlipFlags {
    #[serde(default)]
    pub horizontal: bool,
    #[serde(default)]
    pub vertical: bool,
}

impl FlipFlags {
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical
    }
}

/// Quantization artifacts recorded on the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantization {
    pub color_count: usize,
    #[serde(default)]
    pub simplification: u8,
    /// Palette as `[R, G, B]` triples; labels index into it
    pub palette: Vec<[u8; 3]>,
}

/// Layer set recorded on the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSet {
    /// Resolved print order, paper last
    pub order: Vec<usize>,
    pub built_at: DateTime<Utc>,
}

impl LayerSet {
    pub fn count(&self) -> usize {
        self.order.len()
    }
}

/// Which derived artifacts a transition made stale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invalidation {
    /// Palette, label map and quantized image
    pub quantization: bool,
    pub layers: bool,
    /// Flipped preview of the quantized image
    pub flipped: bool,
}

/// Persistent project record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    pub state: ProjectState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Original image dimensions
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub crop: Option<CropRect>,
    #[serde(default)]
    pub quantization: Option<Quantization>,
    #[serde(default)]
    pub flip: FlipFlags,
    #[serde(default)]
    pub layers: Option<LayerSet>,
}

impl ProjectRecord {
    pub fn new(id: ProjectId, name: String, width: u32, height: u32) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            state: ProjectState::Uploaded,
            created_at: now,
            updated_at: now,
            width,
            height,
            crop: None,
            quantization: None,
            flip: FlipFlags::default(),
            layers: None,
        }
    }

    /// Dimensions of the image quantization works on
    pub fn source_dimensions(&self) -> (u32, u32) {
        match self.crop {
            Some(rect) => (rect.width, rect.height),
            None => (self.width, self.height),
        }
    }

    /// Quantization artifacts, if the project is at or past `quantized`
    pub fn require_quantized(&self, operation: &'static str) -> Result<&Quantization, ProjectError> {
        match self.state {
            ProjectState::Quantized | ProjectState::LayersCreated => self
                .quantization
                .as_ref()
                .ok_or(ProjectError::MissingArtifact("quantization")),
            state => Err(ProjectError::WrongStage { operation, state }),
        }
    }

    /// New crop: everything downstream of the source image goes
    pub fn apply_crop(&mut self, rect: CropRect) -> Result<Invalidation, ProjectError> {
        rect.validate(self.width, self.height)?;
        let invalidation = Invalidation {
            quantization: self.quantization.is_some(),
            layers: self.layers.is_some(),
            flipped: self.flip.any(),
        };
        self.crop = Some(rect);
        self.quantization = None;
        self.layers = None;
        self.flip = FlipFlags::default();
        self.transition(ProjectState::Cropped);
        Ok(invalidation)
    }

    /// The source image was repainted: like a crop, everything derived from
    /// it goes, but the crop itself stays
    pub fn apply_source_edit(&mut self) -> Invalidation {
        let invalidation = Invalidation {
            quantization: self.quantization.is_some(),
            layers: self.layers.is_some(),
            flipped: self.flip.any(),
        };
        self.quantization = None;
        self.layers = None;
        self.flip = FlipFlags::default();
        let state = match self.crop {
            Some(_) => ProjectState::Cropped,
            None => ProjectState::Uploaded,
        };
        self.transition(state);
        invalidation
    }

    /// Fresh quantization replaces the palette and drops any layers
    pub fn apply_quantization(&mut self, quantization: Quantization) -> Invalidation {
        let invalidation = Invalidation {
            layers: self.layers.is_some(),
            ..Invalidation::default()
        };
        self.quantization = Some(quantization);
        self.layers = None;
        self.transition(ProjectState::Quantized);
        invalidation
    }

    /// Swap palette colors; the length must match and layers go stale
    pub fn apply_palette(&mut self, palette: Vec<[u8; 3]>) -> Result<Invalidation, ProjectError> {
        let quantization = self.require_quantized("replace palette")?;
        if palette.len() != quantization.palette.len() {
            return Err(ProjectError::PaletteLength {
                expected: quantization.palette.len(),
                actual: palette.len(),
            });
        }
        let invalidation = self.drop_layers();
        if let Some(quantization) = self.quantization.as_mut() {
            quantization.palette = palette;
        }
        Ok(invalidation)
    }

    /// Record a palette that shrank by one entry after a merge
    pub fn apply_merge(&mut self, palette: Vec<[u8; 3]>) -> Result<Invalidation, ProjectError> {
        self.require_quantized("merge palette entries")?;
        let invalidation = self.drop_layers();
        if let Some(quantization) = self.quantization.as_mut() {
            quantization.color_count = palette.len();
            quantization.palette = palette;
        }
        Ok(invalidation)
    }

    /// Change mirror flags; returns `None` when nothing changed
    pub fn apply_flip(&mut self, flip: FlipFlags) -> Result<Option<Invalidation>, ProjectError> {
        self.require_quantized("flip")?;
        if flip == self.flip {
            return Ok(None);
        }
        let mut invalidation = self.drop_layers();
        invalidation.flipped = self.flip.any() && !flip.any();
        self.flip = flip;
        Ok(Some(invalidation))
    }

    /// Record a freshly built layer set
    pub fn apply_layers(&mut self, order: Vec<usize>) -> Result<(), ProjectError> {
        self.require_quantized("build layers")?;
        self.layers = Some(LayerSet {
            order,
            built_at: Utc::now(),
        });
        self.transition(ProjectState::LayersCreated);
        Ok(())
    }

    fn drop_layers(&mut self) -> Invalidation {
        let invalidation = Invalidation {
            layers: self.layers.take().is_some(),
            ..Invalidation::default()
        };
        self.transition(ProjectState::Quantized);
        invalidation
    }

    fn transition(&mut self, state: ProjectState) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}

/// Project list entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub state: ProjectState,
    pub created_at: DateTime<Utc>,
}

impl From<&ProjectRecord> for ProjectSummary {
    fn from(record: &ProjectRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            state: record.state,
            created_at: record.created_at,
        }
    }
}

/// Full project view returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDetail {
    pub id: String,
    pub name: String,
    pub state: ProjectState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropRect>,
    pub flip: FlipFlags,
    pub color_count: Option<usize>,
    pub simplification: Option<u8>,
    /// Palette as `[R, G, B]` triples
    #[schema(value_type = Option<Vec<Vec<u8>>>)]
    pub palette: Option<Vec<[u8; 3]>>,
    /// Same palette as `#rrggbb` strings
    pub palette_hex: Option<Vec<String>>,
    /// Resolved print order, paper last
    pub layer_order: Option<Vec<usize>>,
    pub layer_count: Option<usize>,
    /// Image names servable under `/images/`
    pub images: Vec<String>,
}

impl From<&ProjectRecord> for ProjectDetail {
    fn from(record: &ProjectRecord) -> Self {
        let mut images = vec!["original.png".to_string()];
        if record.crop.is_some() {
            images.push("cropped.png".into());
        }
        if record.quantization.is_some() {
            images.push("quantized.png".into());
            if record.flip.any() {
                images.push("flipped.png".into());
            }
        }
        if let Some(layers) = &record.layers {
            images.extend((0..layers.count()).map(|i| format!("layer_{i}.png")));
            images.push("progression.gif".into());
        }

        let quantization = record.quantization.as_ref();
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            state: record.state,
            created_at: record.created_at,
            updated_at: record.updated_at,
            width: record.width,
            height: record.height,
            crop: record.crop,
            flip: record.flip,
            color_count: quantization.map(|q| q.color_count),
            simplification: quantization.map(|q| q.simplification),
            palette: quantization.map(|q| q.palette.clone()),
            palette_hex: quantization.map(|q| {
                q.palette
                    .iter()
                    .map(|&c| print_layers::Rgb::from(c).to_hex())
                    .collect()
            }),
            layer_order: record.layers.as_ref().map(|l| l.order.clone()),
            layer_count: record.layers.as_ref().map(|l| l.count()),
            images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProjectRecord {
        ProjectRecord::new(ProjectId::generate(), "linocut".into(), 40, 30)
    }

    fn quantization(colors: usize) -> Quantization {
        let mut palette = vec![[0, 0, 0]; colors - 1];
        palette.push([255, 255, 255]);
        Quantization {
            color_count: colors,
            simplification: 0,
            palette,
        }
    }

    fn with_layers() -> ProjectRecord {
        let mut record = record();
        record.apply_quantization(quantization(3));
        record.apply_layers(vec![0, 1, 2]).unwrap();
        record
    }

    #[test]
    fn test_project_id_format() {
        let id = ProjectId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert_eq!(ProjectId::parse(id.as_str()), Some(id));
        assert_eq!(ProjectId::parse("../etc/passwd"), None);
        assert_eq!(ProjectId::parse("ABCDEF0123456789abcdef0123456789"), None);
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectState::LayersCreated).unwrap();
        assert_eq!(json, "\"layers_created\"");
        assert_eq!(ProjectState::LayersCreated.to_string(), "layers_created");
    }

    #[test]
    fn test_new_project_is_uploaded() {
        let record = record();
        assert_eq!(record.state, ProjectState::Uploaded);
        assert_eq!(record.source_dimensions(), (40, 30));
    }

    #[test]
    fn test_crop_validation() {
        let mut record = record();
        let empty = CropRect { x: 0, y: 0, width: 0, height: 5 };
        assert!(matches!(record.apply_crop(empty), Err(ProjectError::InvalidCrop(_))));

        let outside = CropRect { x: 30, y: 0, width: 20, height: 5 };
        assert!(matches!(record.apply_crop(outside), Err(ProjectError::InvalidCrop(_))));
        assert_eq!(record.state, ProjectState::Uploaded);
    }

    #[test]
    fn test_crop_invalidates_everything_downstream() {
        let mut record = with_layers();
        record.flip = FlipFlags { horizontal: true, vertical: false };

        let rect = CropRect { x: 5, y: 5, width: 10, height: 8 };
        let invalidation = record.apply_crop(rect).unwrap();

        assert_eq!(
            invalidation,
            Invalidation { quantization: true, layers: true, flipped: true }
        );
        assert_eq!(record.state, ProjectState::Cropped);
        assert!(record.quantization.is_none());
        assert!(record.layers.is_none());
        assert!(!record.flip.any());
        assert_eq!(record.source_dimensions(), (10, 8));
    }

    #[test]
    fn test_source_edit_keeps_crop() {
        let mut record = with_layers();
        let invalidation = record.apply_source_edit();
        assert_eq!(
            invalidation,
            Invalidation { quantization: true, layers: true, flipped: false }
        );
        assert_eq!(record.state, ProjectState::Uploaded);
        assert!(record.quantization.is_none());

        let rect = CropRect { x: 0, y: 0, width: 4, height: 4 };
        record.apply_crop(rect).unwrap();
        assert_eq!(record.apply_source_edit(), Invalidation::default());
        assert_eq!(record.state, ProjectState::Cropped);
        assert_eq!(record.crop, Some(rect));
    }

    #[test]
    fn test_quantize_drops_layers() {
        let mut record = with_layers();
        let invalidation = record.apply_quantization(quantization(4));
        assert!(invalidation.layers);
        assert!(!invalidation.quantization);
        assert_eq!(record.state, ProjectState::Quantized);
        assert_eq!(record.quantization.as_ref().unwrap().color_count, 4);
    }

    #[test]
    fn test_palette_requires_quantized() {
        let mut record = record();
        assert!(matches!(
            record.apply_palette(vec![[0, 0, 0], [255, 255, 255]]),
            Err(ProjectError::WrongStage {
                state: ProjectState::Uploaded,
                ..
            })
        ));
    }

    #[test]
    fn test_palette_length_must_match() {
        let mut record = with_layers();
        assert!(matches!(
            record.apply_palette(vec![[0, 0, 0], [255, 255, 255]]),
            Err(ProjectError::PaletteLength { expected: 3, actual: 2 })
        ));
        assert_eq!(record.state, ProjectState::LayersCreated);
    }

    #[test]
    fn test_palette_replace_downgrades_layers() {
        let mut record = with_layers();
        let invalidation = record
            .apply_palette(vec![[200, 0, 0], [0, 0, 200], [255, 255, 255]])
            .unwrap();
        assert!(invalidation.layers);
        assert_eq!(record.state, ProjectState::Quantized);
        assert_eq!(record.quantization.as_ref().unwrap().palette[0], [200, 0, 0]);
    }

    #[test]
    fn test_merge_updates_color_count() {
        let mut record = with_layers();
        record.apply_merge(vec![[0, 0, 0], [255, 255, 255]]).unwrap();
        assert_eq!(record.quantization.as_ref().unwrap().color_count, 2);
        assert_eq!(record.state, ProjectState::Quantized);
    }

    #[test]
    fn test_flip_transitions() {
        let mut record = with_layers();
        assert_eq!(record.apply_flip(FlipFlags::default()).unwrap(), None);
        assert_eq!(record.state, ProjectState::LayersCreated);

        let on = FlipFlags { horizontal: true, vertical: false };
        let invalidation = record.apply_flip(on).unwrap().unwrap();
        assert!(invalidation.layers);
        assert!(!invalidation.flipped);
        assert_eq!(record.state, ProjectState::Quantized);

        let invalidation = record.apply_flip(FlipFlags::default()).unwrap().unwrap();
        assert!(!invalidation.layers);
        assert!(invalidation.flipped);
    }

    #[test]
    fn test_flip_requires_quantized() {
        let mut record = record();
        let on = FlipFlags { horizontal: false, vertical: true };
        assert!(matches!(
            record.apply_flip(on),
            Err(ProjectError::WrongStage { .. })
        ));
    }

    #[test]
    fn test_layers_set_state() {
        let record = with_layers();
        assert_eq!(record.state, ProjectState::LayersCreated);
        assert_eq!(record.layers.as_ref().unwrap().count(), 3);
    }

    #[test]
    fn test_detail_lists_images() {
        let mut record = with_layers();
        record.flip.vertical = true;
        let detail = ProjectDetail::from(&record);
        assert_eq!(
            detail.images,
            vec![
                "original.png",
                "quantized.png",
                "flipped.png",
                "layer_0.png",
                "layer_1.png",
                "layer_2.png",
                "progression.gif"
            ]
        );
        assert_eq!(detail.palette.unwrap()[2], [255, 255, 255]);
        assert_eq!(detail.palette_hex.unwrap()[2], "#ffffff");
        assert_eq!(detail.layer_order, Some(vec![0, 1, 2]));
        assert_eq!(detail.layer_count, Some(3));
    }

    #[test]
    fn test_record_json_roundtrip() {
        let record = with_layers();
        let json = serde_json::to_string(&record).unwrap();
        let back: ProjectRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
