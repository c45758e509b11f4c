pub mod exporter;
pub mod project_service;
pub mod project_store;

pub use exporter::{build_archive, ExportEntry};
pub use project_service::{ProjectService, MAX_COLORS, MIN_COLORS};
pub use project_store::{Artifact, ImageName, ProjectStore};
