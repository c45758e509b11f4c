//! Palette edits applied to an existing label map.
//!
//! Quantization assigns labels once. Everything after that (swapping an
//! ink for another color, merging two inks) rewrites the palette and, when
//! needed, the labels, but never re-runs nearest-color assignment.

use crate::error::EngineError;
use crate::palette::{Palette, PaletteError};
use crate::raster::{LabelMap, Raster, RasterError};

/// Paint every pixel with the palette entry its label points at.
///
/// # Errors
///
/// [`RasterError::LabelOutOfRange`] if a label does not address `palette`.
pub fn render_labels(labels: &LabelMap, palette: &Palette) -> Result<Raster, RasterError> {
    labels.check_palette(palette)?;
    let colors = palette.colors();
    let pixels = labels.labels().iter().map(|&l| colors[l as usize]).collect();
    Ok(Raster::from_parts(labels.width(), labels.height(), pixels))
}

/// Re-render the quantized raster with `replacement` colors in place of
/// `current` ones.
///
/// Labels are reused as-is: a pixel labelled `i` takes `replacement[i]`
/// even when some other entry would now be a closer match.
///
/// # Example
///
/// ```
/// use print_layers::{replace_palette, LabelMap, Palette, Rgb};
///
/// let labels = LabelMap::new(2, 1, vec![0, 1]).unwrap();
/// let current = Palette::new(&[Rgb::BLACK, Rgb::WHITE]).unwrap();
/// let red = Palette::new(&[Rgb::new(255, 0, 0), Rgb::WHITE]).unwrap();
///
/// let raster = replace_palette(&labels, &current, &red).unwrap();
/// assert_eq!(raster.pixels(), &[Rgb::new(255, 0, 0), Rgb::WHITE]);
/// ```
///
/// # Errors
///
/// [`PaletteError::LengthMismatch`] when the palettes differ in length,
/// [`RasterError::LabelOutOfRange`] when the labels do not fit.
pub fn replace_palette(
    labels: &LabelMap,
    current: &Palette,
    replacement: &Palette,
) -> Result<Raster, EngineError> {
    if current.len() != replacement.len() {
        return Err(PaletteError::LengthMismatch {
            expected: current.len(),
            actual: replacement.len(),
        }
        .into());
    }
    Ok(render_labels(labels, replacement)?)
}

/// Result of [`merge_entries`].
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    /// Palette with the removed entry gone.
    pub palette: Palette,
    /// Labels renumbered for the shorter palette.
    pub labels: LabelMap,
    /// Index of the surviving entry in the new palette.
    pub kept_index: usize,
}

/// Fold palette entry `remove` into `keep`.
///
/// Pixels labelled `remove` take the `keep` label, the entry is dropped
/// from the palette and labels above it shift down by one. The paper entry
/// can absorb other entries but cannot itself be removed.
///
/// # Errors
///
/// - [`PaletteError::IndexOutOfRange`] for an index outside the palette
/// - [`PaletteError::MergeIntoSelf`] when `keep == remove`
/// - [`PaletteError::PaperEntry`] when `remove` is the paper entry
/// - [`PaletteError::TooFewColors`] when fewer than two colors would remain
pub fn merge_entries(
    labels: &LabelMap,
    palette: &Palette,
    keep: usize,
    remove: usize,
) -> Result<Merged, PaletteError> {
    palette.check_index(keep)?;
    palette.check_index(remove)?;
    if keep == remove {
        return Err(PaletteError::MergeIntoSelf { index: keep });
    }
    if remove == palette.paper_index() {
        return Err(PaletteError::PaperEntry { index: remove });
    }
    if palette.len() <= 2 {
        return Err(PaletteError::TooFewColors);
    }

    let colors: Vec<_> = palette
        .colors()
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != remove)
        .map(|(_, &c)| c)
        .collect();
    let new_palette = Palette::new(&colors)?;

    let kept_index = if keep > remove { keep - 1 } else { keep };
    let remove = remove as u8;
    let kept_label = kept_index as u8;
    let relabelled = labels
        .labels()
        .iter()
        .map(|&l| match l.cmp(&remove) {
            std::cmp::Ordering::Less => l,
            std::cmp::Ordering::Equal => kept_label,
            std::cmp::Ordering::Greater => l - 1,
        })
        .collect();

    Ok(Merged {
        palette: new_palette,
        labels: LabelMap::from_parts(labels.width(), labels.height(), relabelled),
        kept_index,
    })
}
