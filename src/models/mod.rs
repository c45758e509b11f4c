pub mod config;
pub mod project;

pub use config::{AppConfig, QuantizerConfig};
pub use project::{
    CropRect, FlipFlags, Invalidation, LayerSet, ProjectDetail, ProjectId, ProjectRecord,
    ProjectState, ProjectSummary, Quantization,
};
