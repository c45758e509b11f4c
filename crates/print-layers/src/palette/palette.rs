//! Ordered ink palette with nearest-color lookup.

use std::str::FromStr;

use super::error::PaletteError;
use crate::color::Rgb;

/// Largest palette a `u8` label map can address.
pub const MAX_PALETTE_LEN: usize = 256;

/// An ordered, non-empty sequence of ink colors.
///
/// Entries may repeat: the quantizer pads degenerate images by duplicating
/// a color, and users are free to edit entries to anything. The *paper*
/// entry is the one the layer composer always prints last, see
/// [`Palette::paper_index`].
///
/// # Example
///
/// ```
/// use print_layers::{Palette, Rgb};
///
/// let palette = Palette::new(&[Rgb::BLACK, Rgb::WHITE]).unwrap();
/// assert_eq!(palette.len(), 2);
/// assert_eq!(palette.paper_index(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Create a palette from colors in label order.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::EmptyPalette`] if `colors` is empty
    /// - [`PaletteError::TooManyColors`] if there are more than
    ///   [`MAX_PALETTE_LEN`] colors
    pub fn new(colors: &[Rgb]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        if colors.len() > MAX_PALETTE_LEN {
            return Err(PaletteError::TooManyColors { len: colors.len() });
        }
        Ok(Self {
            colors: colors.to_vec(),
        })
    }

    /// Create a palette from clustered ink colors, appending pure white as
    /// the final entry.
    ///
    /// White is never a clustering output; it is the fixed paper color so
    /// every palette has one universally light entry.
    pub fn with_paper(inks: &[Rgb]) -> Result<Self, PaletteError> {
        let mut colors = Vec::with_capacity(inks.len() + 1);
        colors.extend_from_slice(inks);
        colors.push(Rgb::WHITE);
        Self::new(&colors)
    }

    /// Create a palette from `[R, G, B]` triples.
    pub fn from_bytes(colors: &[[u8; 3]]) -> Result<Self, PaletteError> {
        let colors: Vec<Rgb> = colors.iter().copied().map(Rgb::from_bytes).collect();
        Self::new(&colors)
    }

    /// Create a palette from hex strings like `"#FF0000"` or `"#F00"`.
    pub fn from_hex(colors: &[&str]) -> Result<Self, PaletteError> {
        let colors = colors
            .iter()
            .map(|s| Rgb::from_str(s).map_err(PaletteError::ParseColor))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&colors)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; empty palettes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    #[inline]
    pub fn color(&self, idx: usize) -> Rgb {
        self.colors[idx]
    }

    /// Color at `idx`, or `None` when out of range.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Rgb> {
        self.colors.get(idx).copied()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Colors as `[R, G, B]` triples, for persistence.
    pub fn to_bytes(&self) -> Vec<[u8; 3]> {
        self.colors.iter().map(|c| c.to_bytes()).collect()
    }

    /// Index of the paper entry.
    ///
    /// This is the first entry that is exactly pure white. A palette edit
    /// may replace white with something else; in that case the entry with
    /// the highest luminance is the paper (lowest index on ties).
    pub fn paper_index(&self) -> usize {
        if let Some(idx) = self.colors.iter().position(|c| c.is_white()) {
            return idx;
        }

        let mut best_idx = 0;
        let mut best_lum = f64::MIN;
        for (i, color) in self.colors.iter().enumerate() {
            let lum = color.luminance();
            if lum > best_lum {
                best_lum = lum;
                best_idx = i;
            }
        }
        best_idx
    }

    /// Index of the entry closest to `color` by squared Euclidean RGB
    /// distance. Ties resolve to the lowest index.
    #[inline]
    pub fn nearest(&self, color: Rgb) -> usize {
        // Linear scan; palettes are small
        let mut best_idx = 0;
        let mut best_dist = u32::MAX;
        for (i, &entry) in self.colors.iter().enumerate() {
            let dist = color.distance_squared(entry);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }
        best_idx
    }

    /// Validate that `idx` addresses an entry.
    pub(crate) fn check_index(&self, idx: usize) -> Result<(), PaletteError> {
        if idx < self.colors.len() {
            Ok(())
        } else {
            Err(PaletteError::IndexOutOfRange {
                index: idx,
                len: self.colors.len(),
            })
        }
    }
}
