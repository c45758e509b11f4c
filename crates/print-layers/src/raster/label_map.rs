//! Per-pixel palette index grid and its on-disk format.

use super::error::RasterError;
use super::flip_grid;
use crate::palette::Palette;

/// File magic for serialized label maps.
const MAGIC: &[u8; 4] = b"RPLM";
/// Current serialization version.
const VERSION: u8 = 1;
/// Magic + version + width + height.
const HEADER_LEN: usize = 4 + 1 + 4 + 4;

/// One palette index per pixel, row-major.
///
/// Produced once by quantization and reused by every later palette edit
/// and layer build. Labels are only guaranteed to address the nearest
/// palette color at the moment they were assigned; after a palette
/// replacement they keep pointing at the same *slots*.
///
/// # Serialized form
///
/// ```text
/// "RPLM" | version u8 | width u32 LE | height u32 LE | width*height label bytes
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: usize,
    height: usize,
    labels: Vec<u8>,
}

impl LabelMap {
    /// Create a label map from row-major labels.
    pub fn new(width: usize, height: usize, labels: Vec<u8>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyRaster);
        }
        if labels.len() != width * height {
            return Err(RasterError::SizeMismatch {
                expected: width * height,
                actual: labels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            labels,
        })
    }

    /// Build a label map from already-validated parts.
    pub(crate) fn from_parts(width: usize, height: usize, labels: Vec<u8>) -> Self {
        debug_assert_eq!(labels.len(), width * height);
        Self {
            width,
            height,
            labels,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; empty maps are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the map.
    #[inline]
    pub fn label(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width && y < self.height, "label ({x}, {y}) out of bounds");
        self.labels[y * self.width + x]
    }

    #[inline]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    #[inline]
    pub(crate) fn labels_mut(&mut self) -> &mut [u8] {
        &mut self.labels
    }

    /// Pixel count per label, indexed by label, `palette_len` entries long.
    /// Labels at or above `palette_len` are not counted.
    pub fn counts(&self, palette_len: usize) -> Vec<usize> {
        let mut counts = vec![0usize; palette_len];
        for &label in &self.labels {
            if let Some(slot) = counts.get_mut(label as usize) {
                *slot += 1;
            }
        }
        counts
    }

    /// Check that every label addresses an entry of `palette`.
    pub fn check_palette(&self, palette: &Palette) -> Result<(), RasterError> {
        let len = palette.len();
        match self.labels.iter().find(|&&l| l as usize >= len) {
            Some(&label) => Err(RasterError::LabelOutOfRange {
                label,
                palette_len: len,
            }),
            None => Ok(()),
        }
    }

    /// Copy of this map mirrored left-right and/or top-bottom.
    pub fn flipped(&self, horizontal: bool, vertical: bool) -> Self {
        Self {
            width: self.width,
            height: self.height,
            labels: flip_grid(&self.labels, self.width, self.height, horizontal, vertical),
        }
    }

    /// Serialize to the binary on-disk form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.labels.len());
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.extend_from_slice(&(self.width as u32).to_le_bytes());
        out.extend_from_slice(&(self.height as u32).to_le_bytes());
        out.extend_from_slice(&self.labels);
        out
    }

    /// Decode the binary on-disk form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RasterError> {
        if bytes.len() < HEADER_LEN {
            return Err(RasterError::InvalidLabelData("truncated header"));
        }
        if &bytes[0..4] != MAGIC {
            return Err(RasterError::InvalidLabelData("bad magic"));
        }
        if bytes[4] != VERSION {
            return Err(RasterError::InvalidLabelData("unsupported version"));
        }
        let width = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) as usize;
        let height = u32::from_le_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]) as usize;
        Self::new(width, height, bytes[HEADER_LEN..].to_vec())
    }
}
