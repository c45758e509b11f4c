//! Cumulative layer rendering.

use super::order::{resolve_print_order, PrintOrder};
use crate::color::Rgb;
use crate::error::EngineError;
use crate::palette::Palette;
use crate::raster::{LabelMap, Raster};

/// One print pass and the cumulative result after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Position in the print order, 0 = first pass.
    pub position: usize,
    /// Palette entry printed in this pass.
    pub palette_index: usize,
    /// Ink color of this pass.
    pub color: Rgb,
    /// Paper after passes `0..=position`.
    pub raster: Raster,
}

/// Resolved print order plus one layer per palette entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub order: PrintOrder,
    pub layers: Vec<Layer>,
}

/// Resolve the print order and render one cumulative raster per pass.
///
/// Layer `i` starts from white paper and paints every pixel whose label is
/// among the first `i + 1` entries of the order in that entry's own palette
/// color. The last layer therefore equals the full palette rendering.
///
/// # Example
///
/// ```
/// use print_layers::{compose, LabelMap, Palette, Rgb};
///
/// let palette = Palette::new(&[Rgb::BLACK, Rgb::WHITE]).unwrap();
/// let labels = LabelMap::new(2, 1, vec![0, 1]).unwrap();
///
/// let composition = compose(&palette, &labels, None).unwrap();
/// assert_eq!(composition.order.as_slice(), &[0, 1]);
/// assert_eq!(composition.layers[0].raster.pixels(), &[Rgb::BLACK, Rgb::WHITE]);
/// ```
///
/// # Errors
///
/// Fails when a label does not address `palette` or the explicit order is
/// invalid (see [`resolve_print_order`]).
pub fn compose(
    palette: &Palette,
    labels: &LabelMap,
    explicit_order: Option<&[usize]>,
) -> Result<Composition, EngineError> {
    labels.check_palette(palette)?;
    let order = resolve_print_order(palette, explicit_order)?;
    let ranks = order.ranks();
    let (width, height) = labels.dimensions();

    let mut canvas = Raster::filled(width, height, Rgb::WHITE);
    let mut layers = Vec::with_capacity(order.len());
    for (position, &palette_index) in order.as_slice().iter().enumerate() {
        let color = palette.color(palette_index);
        // Each pass only touches its own region, so earlier regions keep their color
        for (px, &label) in canvas.pixels_mut().iter_mut().zip(labels.labels()) {
            if ranks[label as usize] == position {
                *px = color;
            }
        }
        layers.push(Layer {
            position,
            palette_index,
            color,
            raster: canvas.clone(),
        });
    }

    Ok(Composition { order, layers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ComposeError;
    use crate::raster::RasterError;

    const RED: Rgb = Rgb::new(220, 20, 20);

    #[test]
    fn test_layers_accumulate() {
        let palette = Palette::new(&[RED, Rgb::BLACK, Rgb::WHITE]).unwrap();
        let labels = LabelMap::new(3, 1, vec![0, 1, 2]).unwrap();
        let composition = compose(&palette, &labels, None).unwrap();

        assert_eq!(composition.order.as_slice(), &[1, 0, 2]);
        let rasters: Vec<&[Rgb]> = composition.layers.iter().map(|l| l.raster.pixels()).collect();
        assert_eq!(rasters[0], &[Rgb::WHITE, Rgb::BLACK, Rgb::WHITE]);
        assert_eq!(rasters[1], &[RED, Rgb::BLACK, Rgb::WHITE]);
        assert_eq!(rasters[2], &[RED, Rgb::BLACK, Rgb::WHITE]);
    }

    #[test]
    fn test_layer_metadata() {
        let palette = Palette::new(&[RED, Rgb::BLACK, Rgb::WHITE]).unwrap();
        let labels = LabelMap::new(3, 1, vec![0, 1, 2]).unwrap();
        let composition = compose(&palette, &labels, Some(&[0])).unwrap();

        let meta: Vec<(usize, usize, Rgb)> = composition
            .layers
            .iter()
            .map(|l| (l.position, l.palette_index, l.color))
            .collect();
        assert_eq!(meta, vec![(0, 0, RED), (1, 1, Rgb::BLACK), (2, 2, Rgb::WHITE)]);
    }

    #[test]
    fn test_paper_pass_uses_edited_paper_color() {
        let cream = Rgb::new(250, 240, 220);
        let palette = Palette::new(&[Rgb::BLACK, cream]).unwrap();
        let labels = LabelMap::new(2, 1, vec![0, 1]).unwrap();
        let composition = compose(&palette, &labels, None).unwrap();

        assert_eq!(composition.layers[0].raster.pixels(), &[Rgb::BLACK, Rgb::WHITE]);
        assert_eq!(composition.layers[1].raster.pixels(), &[Rgb::BLACK, cream]);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let palette = Palette::new(&[Rgb::BLACK, Rgb::WHITE]).unwrap();
        let labels = LabelMap::new(2, 1, vec![0, 2]).unwrap();
        assert!(matches!(
            compose(&palette, &labels, None),
            Err(EngineError::Raster(RasterError::LabelOutOfRange { .. }))
        ));

        let labels = LabelMap::new(2, 1, vec![0, 1]).unwrap();
        assert!(matches!(
            compose(&palette, &labels, Some(&[5])),
            Err(EngineError::Compose(ComposeError::IndexOutOfRange { index: 5, len: 2 }))
        ));
    }
}
