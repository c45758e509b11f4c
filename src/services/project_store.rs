//! Filesystem persistence for projects.
//!
//! ```text
//! <root>/<id>/project.json
//!            original.png  cropped.png  quantized.png  flipped.png
//!            labels.bin
//!            layers/layer_<i>.png  layers/progression.gif
//! ```
//!
//! Record writes go through a temp file and a rename, layer sets are staged
//! in a sibling directory and swapped in whole, and deletes rename the
//! directory away before removing it. Readers therefore only ever see a
//! complete generation of each artifact.

use print_layers::{LabelMap, Raster};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::error::ProjectError;
use crate::models::{Invalidation, ProjectId, ProjectRecord};
use crate::rendering::{encode_png, read_png};

const RECORD_FILE: &str = "project.json";
const LAYERS_DIR: &str = "layers";
const LAYERS_STAGING_DIR: &str = "layers.staging";
pub const PROGRESSION_FILE: &str = "progression.gif";
const TRASH_PREFIX: &str = ".trash-";

/// Single-file artifacts stored per project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Original,
    Cropped,
    Quantized,
    Flipped,
    Labels,
}

impl Artifact {
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Original => "original.png",
            Artifact::Cropped => "cropped.png",
            Artifact::Quantized => "quantized.png",
            Artifact::Flipped => "flipped.png",
            Artifact::Labels => "labels.bin",
        }
    }
}

/// Image name a client may request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageName {
    Artifact(Artifact),
    Layer(usize),
    Progression,
}

impl ImageName {
    /// Map a requested file name to a known image; anything else is rejected
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "original.png" => Some(ImageName::Artifact(Artifact::Original)),
            "cropped.png" => Some(ImageName::Artifact(Artifact::Cropped)),
            "quantized.png" => Some(ImageName::Artifact(Artifact::Quantized)),
            "flipped.png" => Some(ImageName::Artifact(Artifact::Flipped)),
            PROGRESSION_FILE => Some(ImageName::Progression),
            _ => {
                let index = name.strip_prefix("layer_")?.strip_suffix(".png")?;
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                index.parse().ok().map(ImageName::Layer)
            }
        }
    }
}

pub fn layer_file_name(index: usize) -> String {
    format!("layer_{index}.png")
}

/// Project directories under a root, plus the per-project lock registry
pub struct ProjectStore {
    root: PathBuf,
    locks: RwLock<HashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl ProjectStore {
    /// Open (and create if needed) the projects root
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            locks: RwLock::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, id: &ProjectId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn artifact_path(&self, id: &ProjectId, artifact: Artifact) -> PathBuf {
        self.project_dir(id).join(artifact.file_name())
    }

    pub fn layer_path(&self, id: &ProjectId, index: usize) -> PathBuf {
        self.project_dir(id).join(LAYERS_DIR).join(layer_file_name(index))
    }

    pub fn progression_path(&self, id: &ProjectId) -> PathBuf {
        self.project_dir(id).join(LAYERS_DIR).join(PROGRESSION_FILE)
    }

    pub fn image_path(&self, id: &ProjectId, name: ImageName) -> PathBuf {
        match name {
            ImageName::Artifact(artifact) => self.artifact_path(id, artifact),
            ImageName::Layer(index) => self.layer_path(id, index),
            ImageName::Progression => self.progression_path(id),
        }
    }

    /// Exclusive section for mutating one project.
    ///
    /// Unknown projects get no registry entry; callers see `NotFound`.
    pub async fn lock(&self, id: &ProjectId) -> Result<OwnedMutexGuard<()>, ProjectError> {
        if !self.exists(id) {
            return Err(ProjectError::NotFound(id.to_string()));
        }
        let existing = self.locks.read().await.get(id).cloned();
        let mutex = match existing {
            Some(mutex) => mutex,
            None => self
                .locks
                .write()
                .await
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone(),
        };
        Ok(mutex.lock_owned().await)
    }

    #[cfg(test)]
    pub(crate) async fn lock_count(&self) -> usize {
        self.locks.read().await.len()
    }

    /// Create the project directory with its original image and record
    pub fn create(&self, record: &ProjectRecord, original: &Raster) -> Result<(), ProjectError> {
        let dir = self.project_dir(&record.id);
        fs::create_dir_all(&dir)?;
        self.write_raster(&record.id, Artifact::Original, original)?;
        self.save(record)?;
        tracing::info!(project = %record.id, dir = %dir.display(), "Created project directory");
        Ok(())
    }

    pub fn exists(&self, id: &ProjectId) -> bool {
        self.project_dir(id).join(RECORD_FILE).is_file()
    }

    pub fn load(&self, id: &ProjectId) -> Result<ProjectRecord, ProjectError> {
        let path = self.project_dir(id).join(RECORD_FILE);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProjectError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&content)?)
    }

    /// Persist the record atomically
    pub fn save(&self, record: &ProjectRecord) -> Result<(), ProjectError> {
        let dir = self.project_dir(&record.id);
        let json = serde_json::to_vec_pretty(record)?;
        write_atomic(&dir.join(RECORD_FILE), &json)?;
        Ok(())
    }

    /// All readable projects, oldest first
    pub fn list(&self) -> Result<Vec<ProjectRecord>, ProjectError> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let Some(id) = entry.file_name().to_str().and_then(ProjectId::parse) else {
                continue;
            };
            match self.load(&id) {
                Ok(record) => records.push(record),
                Err(ProjectError::NotFound(_)) => {}
                Err(e) => tracing::warn!(project = %id, %e, "Skipping unreadable project"),
            }
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_str().cmp(b.id.as_str())));
        Ok(records)
    }

    /// Remove a project and all its artifacts
    pub async fn delete(&self, id: &ProjectId) -> Result<(), ProjectError> {
        if !self.exists(id) {
            return Err(ProjectError::NotFound(id.to_string()));
        }
        let dir = self.project_dir(id);
        let trash = self.root.join(format!("{TRASH_PREFIX}{id}"));
        tokio::task::spawn_blocking(move || {
            if trash.exists() {
                fs::remove_dir_all(&trash)?;
            }
            fs::rename(&dir, &trash)?;
            fs::remove_dir_all(&trash)
        })
        .await??;
        self.locks.write().await.remove(id);
        tracing::info!(project = %id, "Deleted project");
        Ok(())
    }

    pub fn write_raster(
        &self,
        id: &ProjectId,
        artifact: Artifact,
        raster: &Raster,
    ) -> Result<(), ProjectError> {
        let png = encode_png(raster)?;
        write_atomic(&self.artifact_path(id, artifact), &png)?;
        Ok(())
    }

    pub fn read_raster(&self, id: &ProjectId, artifact: Artifact) -> Result<Raster, ProjectError> {
        let path = self.artifact_path(id, artifact);
        if !path.is_file() {
            return Err(ProjectError::MissingArtifact(artifact.file_name()));
        }
        read_png(&path)
    }

    pub fn write_labels(&self, id: &ProjectId, labels: &LabelMap) -> Result<(), ProjectError> {
        write_atomic(&self.artifact_path(id, Artifact::Labels), &labels.to_bytes())?;
        Ok(())
    }

    pub fn read_labels(&self, id: &ProjectId) -> Result<LabelMap, ProjectError> {
        let path = self.artifact_path(id, Artifact::Labels);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProjectError::MissingArtifact("label map"));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(LabelMap::from_bytes(&bytes)?)
    }

    pub fn remove_artifact(&self, id: &ProjectId, artifact: Artifact) -> Result<(), ProjectError> {
        remove_if_exists(&self.artifact_path(id, artifact))
    }

    /// Replace the whole layer set with `layers`, in order, and its
    /// animated progression
    pub fn replace_layers(
        &self,
        id: &ProjectId,
        layers: &[Raster],
        progression: &[u8],
    ) -> Result<(), ProjectError> {
        let dir = self.project_dir(id);
        let staging = dir.join(LAYERS_STAGING_DIR);
        let target = dir.join(LAYERS_DIR);

        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;
        for (i, raster) in layers.iter().enumerate() {
            fs::write(staging.join(layer_file_name(i)), encode_png(raster)?)?;
        }
        fs::write(staging.join(PROGRESSION_FILE), progression)?;

        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&staging, &target)?;
        Ok(())
    }

    pub fn remove_layers(&self, id: &ProjectId) -> Result<(), ProjectError> {
        let target = self.project_dir(id).join(LAYERS_DIR);
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        Ok(())
    }

    /// Delete the files a state transition made stale
    pub fn invalidate(&self, id: &ProjectId, invalidation: Invalidation) -> Result<(), ProjectError> {
        if invalidation.quantization {
            self.remove_artifact(id, Artifact::Quantized)?;
            self.remove_artifact(id, Artifact::Labels)?;
        }
        if invalidation.layers {
            self.remove_layers(id)?;
        }
        if invalidation.flipped {
            self.remove_artifact(id, Artifact::Flipped)?;
        }
        if invalidation != Invalidation::default() {
            tracing::debug!(project = %id, ?invalidation, "Invalidated artifacts");
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

fn remove_if_exists(path: &Path) -> Result<(), ProjectError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectState;
    use print_layers::Rgb;

    fn store() -> (tempfile::TempDir, ProjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::open(dir.path().join("projects")).unwrap();
        (dir, store)
    }

    fn raster() -> Raster {
        Raster::new(2, 2, vec![Rgb::BLACK, Rgb::WHITE, Rgb::WHITE, Rgb::BLACK]).unwrap()
    }

    fn create(store: &ProjectStore, name: &str) -> ProjectRecord {
        let record = ProjectRecord::new(ProjectId::generate(), name.into(), 2, 2);
        store.create(&record, &raster()).unwrap();
        record
    }

    #[test]
    fn test_image_name_parse() {
        assert_eq!(
            ImageName::parse("quantized.png"),
            Some(ImageName::Artifact(Artifact::Quantized))
        );
        assert_eq!(ImageName::parse("layer_3.png"), Some(ImageName::Layer(3)));
        assert_eq!(ImageName::parse("progression.gif"), Some(ImageName::Progression));
        assert_eq!(ImageName::parse("labels.bin"), None);
        assert_eq!(ImageName::parse("project.json"), None);
        assert_eq!(ImageName::parse("layer_.png"), None);
        assert_eq!(ImageName::parse("layer_-1.png"), None);
        assert_eq!(ImageName::parse("../original.png"), None);
    }

    #[test]
    fn test_create_and_load() {
        let (_dir, store) = store();
        let record = create(&store, "birch");

        let loaded = store.load(&record.id).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(
            store.read_raster(&record.id, Artifact::Original).unwrap(),
            raster()
        );
        assert!(!store.project_dir(&record.id).join("project.json.tmp").exists());
    }

    #[test]
    fn test_load_unknown_project() {
        let (_dir, store) = store();
        let id = ProjectId::generate();
        assert!(matches!(store.load(&id), Err(ProjectError::NotFound(_))));
    }

    #[test]
    fn test_list_sorted_and_skips_foreign_dirs() {
        let (_dir, store) = store();
        let first = create(&store, "first");
        let second = create(&store, "second");
        fs::create_dir_all(store.root().join("not-a-project")).unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&first.id));
        assert!(names.contains(&second.id));
    }

    #[test]
    fn test_labels_roundtrip_and_missing() {
        let (_dir, store) = store();
        let record = create(&store, "labels");
        assert!(matches!(
            store.read_labels(&record.id),
            Err(ProjectError::MissingArtifact("label map"))
        ));

        let labels = LabelMap::new(2, 2, vec![0, 1, 1, 0]).unwrap();
        store.write_labels(&record.id, &labels).unwrap();
        assert_eq!(store.read_labels(&record.id).unwrap(), labels);
    }

    #[test]
    fn test_replace_layers_swaps_whole_set() {
        let (_dir, store) = store();
        let record = create(&store, "layers");

        store
            .replace_layers(&record.id, &[raster(), raster(), raster()], b"GIF89a-old")
            .unwrap();
        assert!(store.layer_path(&record.id, 2).is_file());

        store
            .replace_layers(&record.id, &[raster(), raster()], b"GIF89a-new")
            .unwrap();
        assert!(store.layer_path(&record.id, 1).is_file());
        assert_eq!(fs::read(store.progression_path(&record.id)).unwrap(), b"GIF89a-new");
        assert!(!store.layer_path(&record.id, 2).exists());
        assert!(!store.project_dir(&record.id).join(LAYERS_STAGING_DIR).exists());
    }

    #[test]
    fn test_invalidate_removes_files() {
        let (_dir, store) = store();
        let record = create(&store, "invalidate");
        store.write_raster(&record.id, Artifact::Quantized, &raster()).unwrap();
        store.write_raster(&record.id, Artifact::Flipped, &raster()).unwrap();
        store
            .write_labels(&record.id, &LabelMap::new(1, 1, vec![0]).unwrap())
            .unwrap();
        store.replace_layers(&record.id, &[raster()], b"GIF89a").unwrap();

        store
            .invalidate(
                &record.id,
                Invalidation {
                    quantization: true,
                    layers: true,
                    flipped: true,
                },
            )
            .unwrap();

        assert!(!store.artifact_path(&record.id, Artifact::Quantized).exists());
        assert!(!store.artifact_path(&record.id, Artifact::Labels).exists());
        assert!(!store.artifact_path(&record.id, Artifact::Flipped).exists());
        assert!(!store.layer_path(&record.id, 0).exists());
        assert!(!store.progression_path(&record.id).exists());
        assert!(store.artifact_path(&record.id, Artifact::Original).exists());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store) = store();
        let record = create(&store, "delete");
        let _guard = store.lock(&record.id).await.unwrap();
        drop(_guard);

        store.delete(&record.id).await.unwrap();
        assert!(!store.project_dir(&record.id).exists());
        assert!(matches!(
            store.delete(&record.id).await,
            Err(ProjectError::NotFound(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_per_project() {
        let (_dir, store) = store();
        let a = create(&store, "a").id;
        let b = create(&store, "b").id;

        let guard_a = store.lock(&a).await.unwrap();
        // A different project is not blocked
        let _guard_b = store.lock(&b).await.unwrap();

        let mutex = store.locks.read().await.get(&a).cloned().unwrap();
        assert!(mutex.try_lock().is_err());
        drop(guard_a);
        assert!(mutex.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_lock_unknown_project_leaves_no_entry() {
        let (_dir, store) = store();
        for _ in 0..100 {
            assert!(matches!(
                store.lock(&ProjectId::generate()).await,
                Err(ProjectError::NotFound(_))
            ));
        }
        assert_eq!(store.lock_count().await, 0);
    }

    #[test]
    fn test_record_state_persisted() {
        let (_dir, store) = store();
        let mut record = create(&store, "state");
        record.state = ProjectState::Cropped;
        store.save(&record).unwrap();
        assert_eq!(store.load(&record.id).unwrap().state, ProjectState::Cropped);
    }
}
