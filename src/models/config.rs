use print_layers::QuantizeOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Root directory holding one subdirectory per project
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,

    /// Largest accepted upload body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Clustering parameters
    #[serde(default)]
    pub quantizer: QuantizerConfig,
}

fn default_projects_dir() -> PathBuf {
    PathBuf::from("./projects")
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

/// k-means parameters used for every quantization
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct QuantizerConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Independent k-means runs; the lowest-scoring one wins
    #[serde(default = "default_restarts")]
    pub restarts: usize,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Pixels sampled for clustering (labels always cover every pixel)
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Largest centroid movement, in RGB units, that counts as converged
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_seed() -> u64 {
    42
}

fn default_restarts() -> usize {
    3
}

fn default_max_iterations() -> usize {
    30
}

fn default_sample_size() -> usize {
    50_000
}

fn default_tolerance() -> f64 {
    0.5
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            restarts: default_restarts(),
            max_iterations: default_max_iterations(),
            sample_size: default_sample_size(),
            tolerance: default_tolerance(),
        }
    }
}

impl QuantizerConfig {
    /// Engine options for one quantization run
    pub fn options(&self, simplification: u8) -> QuantizeOptions {
        QuantizeOptions::new()
            .seed(self.seed)
            .restarts(self.restarts)
            .max_iterations(self.max_iterations)
            .sample_size(self.sample_size)
            .tolerance(self.tolerance)
            .simplification(simplification)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            quantizer: QuantizerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        projects_dir = %config.projects_dir.display(),
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `CONFIG_FILE` and apply the `PROJECTS_DIR` override
    pub fn from_env() -> Self {
        let config_file = std::env::var("CONFIG_FILE").ok().map(PathBuf::from);
        let mut config = Self::load(config_file.as_deref());
        if let Ok(dir) = std::env::var("PROJECTS_DIR") {
            config.projects_dir = PathBuf::from(dir);
        }
        config
    }
}
