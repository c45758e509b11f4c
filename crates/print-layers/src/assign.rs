//! Label assignment: nearest palette color per pixel.
//!
//! Dense `O(width * height * K)` scan. Palettes top out at a dozen colors
//! in practice, so no spatial index is worth building. Rows are processed
//! one at a time straight into the output buffer; no distance matrix is
//! materialized.

use crate::color::Rgb;
use crate::palette::Palette;
use crate::raster::{LabelMap, Raster};

/// Compute, for every pixel of `raster`, the index of the nearest entry in
/// `palette` by squared Euclidean RGB distance (lowest index on ties).
///
/// # Example
///
/// ```
/// use print_layers::{assign_labels, Palette, Raster, Rgb};
///
/// let raster = Raster::new(2, 1, vec![Rgb::new(20, 10, 5), Rgb::new(230, 240, 250)]).unwrap();
/// let palette = Palette::new(&[Rgb::BLACK, Rgb::WHITE]).unwrap();
/// let labels = assign_labels(&raster, &palette);
/// assert_eq!(labels.labels(), &[0, 1]);
/// ```
pub fn assign_labels(raster: &Raster, palette: &Palette) -> LabelMap {
    let (width, height) = raster.dimensions();
    let mut labels = Vec::with_capacity(raster.len());

    for row in raster.pixels().chunks_exact(width) {
        // Adjacent pixels in photos repeat often; skip the scan when they do
        let mut last: Option<(Rgb, u8)> = None;
        for &px in row {
            let label = match last {
                Some((color, label)) if color == px => label,
                _ => palette.nearest(px) as u8,
            };
            last = Some((px, label));
            labels.push(label);
        }
    }

    LabelMap::from_parts(width, height, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(px: Rgb, palette: &Palette) -> usize {
        let mut best = 0;
        for (i, &c) in palette.colors().iter().enumerate() {
            if px.distance_squared(c) < px.distance_squared(palette.color(best)) {
                best = i;
            }
        }
        best
    }

    #[test]
    fn test_assign_matches_brute_force() {
        let palette = Palette::new(&[
            Rgb::new(12, 40, 90),
            Rgb::new(200, 30, 30),
            Rgb::new(90, 160, 60),
            Rgb::new(128, 128, 128),
            Rgb::WHITE,
        ])
        .unwrap();

        let mut pixels = Vec::new();
        for i in 0..(16 * 12) {
            let v = (i * 37 % 256) as u8;
            pixels.push(Rgb::new(v, v.wrapping_mul(3), 255 - v));
        }
        let raster = Raster::new(16, 12, pixels).unwrap();
        let labels = assign_labels(&raster, &palette);

        assert_eq!(labels.dimensions(), (16, 12));
        for (px, &label) in raster.pixels().iter().zip(labels.labels()) {
            assert_eq!(label as usize, brute_force(*px, &palette));
        }
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        // Duplicate entries: the first one must win
        let palette = Palette::new(&[Rgb::new(9, 9, 9), Rgb::BLACK, Rgb::BLACK]).unwrap();
        let raster = Raster::new(1, 1, vec![Rgb::BLACK]).unwrap();
        assert_eq!(assign_labels(&raster, &palette).labels(), &[1]);
    }

    #[test]
    fn test_single_color_palette() {
        let palette = Palette::new(&[Rgb::new(50, 60, 70)]).unwrap();
        let raster = Raster::new(3, 1, vec![Rgb::BLACK, Rgb::WHITE, Rgb::new(1, 2, 3)]).unwrap();
        assert_eq!(assign_labels(&raster, &palette).labels(), &[0, 0, 0]);
    }
}
