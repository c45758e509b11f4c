//! Color quantization into a bounded ink palette.
//!
//! The quantizer clusters the pixels of a raster into `color_count - 1` ink
//! colors, appends pure white as the paper entry, assigns every pixel to
//! its nearest entry and renders the reduced raster:
//!
//! ```text
//! raster --sample--> k-means (seeded, restarts) --round--> inks
//!                                                           |
//!                                         inks + WHITE = palette
//!                                                           |
//! raster ------------------ assign_labels -------------> label map
//!                                                           |
//!                                        (optional simplification)
//!                                                           |
//!                            palette[label] per pixel = quantized raster
//! ```
//!
//! Images with no more distinct non-white colors than requested inks skip
//! clustering and use those colors directly, padded with the most frequent
//! one. Pure white is reserved for the paper slot: an ink that would be
//! white is stored as [`NEAR_WHITE`] instead.

mod options;
mod simplify;

pub use options::QuantizeOptions;
pub use simplify::simplify_labels;

use std::collections::HashMap;

use kmeans_colors::{get_kmeans, Kmeans};
use palette_color::Srgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assign::assign_labels;
use crate::color::Rgb;
use crate::error::EngineError;
use crate::palette::{Palette, MAX_PALETTE_LEN};
use crate::raster::{LabelMap, Raster};
use crate::recolor::render_labels;

/// Smallest palette the quantizer produces: one ink plus paper.
pub const MIN_COLOR_COUNT: usize = 2;

/// Stand-in for an ink that would otherwise duplicate the paper white.
pub const NEAR_WHITE: Rgb = Rgb::new(254, 254, 254);

/// Output of [`Quantizer::quantize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Quantized {
    /// Ink colors followed by pure white in the last slot.
    pub palette: Palette,
    /// Per-pixel palette index.
    pub labels: LabelMap,
    /// `palette[labels[p]]` for every pixel `p`.
    pub raster: Raster,
}

/// Clusters rasters into a fixed number of colors.
///
/// # Example
///
/// ```
/// use print_layers::{Quantizer, Raster, Rgb};
///
/// let pixels = vec![Rgb::BLACK, Rgb::BLACK, Rgb::new(250, 250, 250), Rgb::WHITE];
/// let raster = Raster::new(2, 2, pixels).unwrap();
///
/// let result = Quantizer::default().quantize(&raster, 2).unwrap();
/// assert_eq!(result.palette.len(), 2);
/// assert_eq!(result.palette.color(1), Rgb::WHITE);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Quantizer {
    options: QuantizeOptions,
}

impl Quantizer {
    pub fn new(options: QuantizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &QuantizeOptions {
        &self.options
    }

    /// Reduce `raster` to `color_count` colors, the last of which is white.
    ///
    /// Callers validate `color_count` against their own bounds; here it only
    /// has to be at least 2 and fit a `u8` label.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidColorCount`] when `color_count` is outside
    /// `2..=256`.
    pub fn quantize(&self, raster: &Raster, color_count: usize) -> Result<Quantized, EngineError> {
        if !(MIN_COLOR_COUNT..=MAX_PALETTE_LEN).contains(&color_count) {
            return Err(EngineError::InvalidColorCount {
                requested: color_count,
            });
        }
        let clusters = color_count - 1;

        let inks = match distinct_colors(raster, clusters) {
            Some(distinct) => pad_distinct(&distinct, clusters),
            None => self.cluster(raster, clusters),
        };

        let palette = Palette::with_paper(&inks)?;
        let mut labels = assign_labels(raster, &palette);
        simplify_labels(&mut labels, palette.len(), self.options.simplification);
        let raster = render_labels(&labels, &palette)?;

        Ok(Quantized {
            palette,
            labels,
            raster,
        })
    }

    /// k-means over a seeded pixel sample, centroids rounded to RGB.
    ///
    /// Each restart is an independent run seeded from `seed + restart`; the
    /// run with the lowest final score is kept.
    fn cluster(&self, raster: &Raster, k: usize) -> Vec<Rgb> {
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let samples = sample_pixels(raster.pixels(), self.options.sample_size.max(k), &mut rng);
        let tolerance = (self.options.tolerance / 255.0) as f32;
        let converge = tolerance * tolerance;

        let run = |restart: usize| -> Kmeans<Srgb> {
            get_kmeans(
                k,
                self.options.max_iterations,
                converge,
                false,
                &samples,
                self.options.seed.wrapping_add(restart as u64),
            )
        };
        let mut best = run(0);
        for restart in 1..self.options.restarts {
            let candidate = run(restart);
            if candidate.score < best.score {
                best = candidate;
            }
        }

        best.centroids.iter().map(|c| to_ink(*c)).collect()
    }
}

#[inline]
fn round_channel(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Rounded centroid color, never the paper white.
fn to_ink(centroid: Srgb) -> Rgb {
    let ink = Rgb::new(
        round_channel(centroid.red),
        round_channel(centroid.green),
        round_channel(centroid.blue),
    );
    if ink.is_white() {
        NEAR_WHITE
    } else {
        ink
    }
}

/// Every pixel when the raster is small enough, otherwise `max` pixels
/// drawn uniformly with replacement.
fn sample_pixels<R: Rng>(pixels: &[Rgb], max: usize, rng: &mut R) -> Vec<Srgb> {
    let to_srgb = |c: &Rgb| Srgb::new(c.r, c.g, c.b).into_format::<f32>();
    let max = max.max(1);
    if pixels.len() <= max {
        return pixels.iter().map(to_srgb).collect();
    }
    (0..max)
        .map(|_| to_srgb(&pixels[rng.gen_range(0..pixels.len())]))
        .collect()
}

/// Distinct non-white colors with their pixel counts, most frequent first
/// (ties by color bytes), or `None` as soon as there are more than `limit`.
///
/// White pixels always label to the paper entry, so they never need an ink.
fn distinct_colors(raster: &Raster, limit: usize) -> Option<Vec<(Rgb, usize)>> {
    let mut counts: HashMap<Rgb, usize> = HashMap::new();
    for &px in raster.pixels().iter().filter(|px| !px.is_white()) {
        *counts.entry(px).or_insert(0) += 1;
        if counts.len() > limit {
            return None;
        }
    }

    let mut distinct: Vec<(Rgb, usize)> = counts.into_iter().collect();
    distinct.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.to_bytes().cmp(&b.0.to_bytes())));
    Some(distinct)
}

/// Use the available colors as inks, duplicating the most frequent one
/// until there are `k`. An all-white image gets [`NEAR_WHITE`] inks.
fn pad_distinct(distinct: &[(Rgb, usize)], k: usize) -> Vec<Rgb> {
    let mut inks: Vec<Rgb> = distinct.iter().map(|&(c, _)| c).collect();
    let most_frequent = inks.first().copied().unwrap_or(NEAR_WHITE);
    inks.resize(k, most_frequent);
    inks
}
