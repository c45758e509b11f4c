//! Quantizer options.

/// Configuration for [`Quantizer`](super::Quantizer).
///
/// # Defaults
///
/// - seed `42`, so the same image always yields the same palette
/// - `3` restarts, keeping the run with the lowest score
/// - `30` iterations per restart
/// - clustering on at most `50_000` sampled pixels
/// - convergence once the centroids move less than `0.5` RGB units in total
/// - no spatial simplification
///
/// # Example
///
/// ```
/// use print_layers::QuantizeOptions;
///
/// let options = QuantizeOptions::new().seed(7).restarts(5).simplification(40);
/// assert_eq!(options.restarts, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeOptions {
    /// Seed for the clustering RNG.
    pub seed: u64,
    /// Number of independent k-means runs (at least 1 is always made).
    pub restarts: usize,
    /// Iteration cap per run.
    pub max_iterations: usize,
    /// Maximum number of pixels fed to clustering.
    pub sample_size: usize,
    /// Total centroid movement (RGB units) still counted as converged.
    pub tolerance: f64,
    /// Spatial cleanup strength, 0-100. Zero keeps the pure nearest-color
    /// label map.
    pub simplification: u8,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            restarts: 3,
            max_iterations: 30,
            sample_size: 50_000,
            tolerance: 0.5,
            simplification: 0,
        }
    }
}

impl QuantizeOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    #[inline]
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[inline]
    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    #[inline]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set simplification strength; values above 100 are clamped.
    #[inline]
    pub fn simplification(mut self, simplification: u8) -> Self {
        self.simplification = simplification.min(100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = QuantizeOptions::default();
        assert_eq!(options.seed, 42);
        assert_eq!(options.restarts, 3);
        assert_eq!(options.max_iterations, 30);
        assert_eq!(options.sample_size, 50_000);
        assert_eq!(options.simplification, 0);
    }

    #[test]
    fn test_simplification_is_clamped() {
        assert_eq!(QuantizeOptions::new().simplification(250).simplification, 100);
    }
}
