//! Error types for raster and label map construction

use std::fmt;

/// Error type for pixel grid construction and decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterError {
    /// Width or height is zero
    EmptyRaster,
    /// Buffer length does not match `width * height` (times channels)
    SizeMismatch {
        /// Expected buffer length
        expected: usize,
        /// Actual buffer length
        actual: usize,
    },
    /// Two grids that must share dimensions do not
    DimensionMismatch {
        /// Expected `(width, height)`
        expected: (usize, usize),
        /// Actual `(width, height)`
        actual: (usize, usize),
    },
    /// A label does not address any palette entry
    LabelOutOfRange {
        /// Offending label value
        label: u8,
        /// Palette length
        palette_len: usize,
    },
    /// Serialized label map is malformed
    InvalidLabelData(&'static str),
    /// A pixel coordinate lies outside the grid
    PointOutOfBounds {
        /// Requested `(x, y)`
        point: (usize, usize),
        /// Grid `(width, height)`
        dimensions: (usize, usize),
    },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::EmptyRaster => write!(f, "raster must have non-zero width and height"),
            RasterError::SizeMismatch { expected, actual } => {
                write!(f, "buffer length {} does not match expected {}", actual, expected)
            }
            RasterError::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            RasterError::LabelOutOfRange { label, palette_len } => write!(
                f,
                "label {} out of range for palette of {} colors",
                label, palette_len
            ),
            RasterError::InvalidLabelData(reason) => write!(f, "invalid label map data: {}", reason),
            RasterError::PointOutOfBounds { point, dimensions } => write!(
                f,
                "point ({}, {}) is outside the {}x{} image",
                point.0, point.1, dimensions.0, dimensions.1
            ),
        }
    }
}

impl std::error::Error for RasterError {}
