//! Flood fill for clearing backgrounds before quantization.
//!
//! A busy backdrop behind the subject would otherwise cost the print one or
//! more inks. Filling it with paper white (or any flat color) first lets
//! the quantizer spend its palette on the subject.

use std::collections::VecDeque;

use crate::color::Rgb;
use crate::raster::{Raster, RasterError};

/// Result of [`flood_fill`].
#[derive(Debug, Clone, PartialEq)]
pub struct Filled {
    /// Copy of the input with the connected region repainted.
    pub raster: Raster,
    /// Number of pixels repainted, the seed included.
    pub pixels: usize,
}

/// Repaint the 4-connected region around `(x, y)` with `color`.
///
/// A neighbor joins the region when its Euclidean RGB distance to the seed
/// pixel's color is at most `tolerance`. The seed itself is always painted,
/// so a tolerance of zero repaints the exact-color patch under the seed.
///
/// # Example
///
/// ```
/// use print_layers::{flood_fill, Raster, Rgb};
///
/// let grey = Rgb::new(128, 128, 128);
/// let raster = Raster::new(3, 1, vec![grey, grey, Rgb::BLACK]).unwrap();
///
/// let filled = flood_fill(&raster, 0, 0, 0.0, Rgb::WHITE).unwrap();
/// assert_eq!(filled.raster.pixels(), &[Rgb::WHITE, Rgb::WHITE, Rgb::BLACK]);
/// assert_eq!(filled.pixels, 2);
/// ```
///
/// # Errors
///
/// [`RasterError::PointOutOfBounds`] when the seed is outside the raster.
pub fn flood_fill(
    raster: &Raster,
    x: usize,
    y: usize,
    tolerance: f64,
    color: Rgb,
) -> Result<Filled, RasterError> {
    let (width, height) = raster.dimensions();
    if x >= width || y >= height {
        return Err(RasterError::PointOutOfBounds {
            point: (x, y),
            dimensions: (width, height),
        });
    }

    let source = raster.pixels();
    let seed = source[y * width + x];
    let within = |px: Rgb| (px.distance_squared(seed) as f64).sqrt() <= tolerance;

    let mut pixels = source.to_vec();
    let mut visited = vec![false; source.len()];
    let mut queue = VecDeque::from([(x, y)]);
    visited[y * width + x] = true;
    let mut painted = 0;

    while let Some((cx, cy)) = queue.pop_front() {
        pixels[cy * width + cx] = color;
        painted += 1;

        let neighbors = [
            (cx.checked_sub(1), Some(cy)),
            (Some(cx + 1).filter(|&nx| nx < width), Some(cy)),
            (Some(cx), cy.checked_sub(1)),
            (Some(cx), Some(cy + 1).filter(|&ny| ny < height)),
        ];
        for (nx, ny) in neighbors {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            let index = ny * width + nx;
            if visited[index] {
                continue;
            }
            visited[index] = true;
            // Compare against the untouched source so repainting never
            // changes which pixels join
            if within(source[index]) {
                queue.push_back((nx, ny));
            }
        }
    }

    Ok(Filled {
        raster: Raster::from_parts(width, height, pixels),
        pixels: painted,
    })
}

/// [`flood_fill`] with paper white.
pub fn flood_fill_to_white(
    raster: &Raster,
    x: usize,
    y: usize,
    tolerance: f64,
) -> Result<Filled, RasterError> {
    flood_fill(raster, x, y, tolerance, Rgb::WHITE)
}
