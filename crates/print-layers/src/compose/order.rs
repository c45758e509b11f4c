//! Print order derivation.

use super::error::ComposeError;
use crate::palette::Palette;

/// A permutation of palette indices, first pass first, paper last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOrder(Vec<usize>);

impl PrintOrder {
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Palette index printed last.
    pub fn paper(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Position of every palette index in the order, indexed by palette index.
    pub(crate) fn ranks(&self) -> Vec<usize> {
        let mut ranks = vec![0; self.0.len()];
        for (position, &index) in self.0.iter().enumerate() {
            ranks[index] = position;
        }
        ranks
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl AsRef<[usize]> for PrintOrder {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

/// Ascending luminance, stable on ties, paper entry moved to the end.
///
/// ```
/// use print_layers::{default_order, Palette, Rgb};
///
/// let palette = Palette::new(&[Rgb::new(200, 40, 40), Rgb::BLACK, Rgb::WHITE]).unwrap();
/// assert_eq!(default_order(&palette).as_slice(), &[1, 0, 2]);
/// ```
pub fn default_order(palette: &Palette) -> PrintOrder {
    let mut indices: Vec<usize> = (0..palette.len()).collect();
    indices.sort_by(|&a, &b| {
        palette
            .color(a)
            .luminance()
            .total_cmp(&palette.color(b).luminance())
    });
    PrintOrder(pin_paper(indices, palette.paper_index()))
}

/// Resolve an optional user-supplied order into a full print order.
///
/// The explicit order decides the relative order of the indices it names.
/// Indices it leaves out follow in default order, and the paper entry is
/// always moved to the last position wherever it appeared.
///
/// # Errors
///
/// [`ComposeError::IndexOutOfRange`] or [`ComposeError::DuplicateIndex`]
/// when `explicit` is not a subset of the palette's indices.
pub fn resolve_print_order(
    palette: &Palette,
    explicit: Option<&[usize]>,
) -> Result<PrintOrder, ComposeError> {
    let Some(explicit) = explicit else {
        return Ok(default_order(palette));
    };

    let len = palette.len();
    let mut seen = vec![false; len];
    for &index in explicit {
        if index >= len {
            return Err(ComposeError::IndexOutOfRange { index, len });
        }
        if seen[index] {
            return Err(ComposeError::DuplicateIndex { index });
        }
        seen[index] = true;
    }

    let mut indices = explicit.to_vec();
    indices.extend(
        default_order(palette)
            .into_vec()
            .into_iter()
            .filter(|&i| !seen[i]),
    );
    Ok(PrintOrder(pin_paper(indices, palette.paper_index())))
}

fn pin_paper(mut indices: Vec<usize>, paper: usize) -> Vec<usize> {
    indices.retain(|&i| i != paper);
    indices.push(paper);
    indices
}
