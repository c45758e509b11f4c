//! RGB raster

use super::error::RasterError;
use super::flip_grid;
use crate::color::Rgb;

/// A 2-D grid of RGB pixels in row-major order.
///
/// # Example
///
/// ```
/// use print_layers::{Raster, Rgb};
///
/// let raster = Raster::from_rgb_bytes(2, 1, &[0, 0, 0, 255, 255, 255]).unwrap();
/// assert_eq!(raster.pixel(1, 0), Rgb::WHITE);
/// assert_eq!(raster.to_rgb_bytes().len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Raster {
    /// Create a raster from row-major pixels.
    ///
    /// # Errors
    ///
    /// - [`RasterError::EmptyRaster`] if either dimension is zero
    /// - [`RasterError::SizeMismatch`] if `pixels.len() != width * height`
    pub fn new(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyRaster);
        }
        if pixels.len() != width * height {
            return Err(RasterError::SizeMismatch {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a raster from interleaved `[R, G, B, R, G, B, ...]` bytes.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, RasterError> {
        if bytes.len() != width * height * 3 {
            return Err(RasterError::SizeMismatch {
                expected: width * height * 3,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Raster of the given size with every pixel set to `color`.
    ///
    /// Callers guarantee non-zero dimensions.
    pub(crate) fn filled(width: usize, height: usize, color: Rgb) -> Self {
        debug_assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Build a raster from already-validated parts.
    pub(crate) fn from_parts(width: usize, height: usize, pixels: Vec<Rgb>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
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

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false; empty rasters are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the raster.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// Interleaved `[R, G, B, ...]` bytes, `width * height * 3` long.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            rgb.extend_from_slice(&px.to_bytes());
        }
        rgb
    }

    /// Copy of this raster mirrored left-right and/or top-bottom.
    pub fn flipped(&self, horizontal: bool, vertical: bool) -> Self {
        Self::from_parts(
            self.width,
            self.height,
            flip_grid(&self.pixels, self.width, self.height, horizontal, vertical),
        )
    }
}
