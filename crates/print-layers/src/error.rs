//! Unified engine error

use std::fmt;

use crate::compose::ComposeError;
use crate::palette::PaletteError;
use crate::raster::RasterError;

/// Any failure raised by the engine's top-level operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Palette construction or edit failed
    Palette(PaletteError),
    /// Raster or label map mismatch
    Raster(RasterError),
    /// Explicit print order is invalid
    Compose(ComposeError),
    /// Requested palette size cannot be produced
    InvalidColorCount {
        /// Requested number of colors
        requested: usize,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Palette(err) => write!(f, "{}", err),
            EngineError::Raster(err) => write!(f, "{}", err),
            EngineError::Compose(err) => write!(f, "{}", err),
            EngineError::InvalidColorCount { requested } => write!(
                f,
                "cannot quantize to {} colors (supported: {}..={})",
                requested,
                crate::quantize::MIN_COLOR_COUNT,
                crate::palette::MAX_PALETTE_LEN
            ),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Palette(err) => Some(err),
            EngineError::Raster(err) => Some(err),
            EngineError::Compose(err) => Some(err),
            EngineError::InvalidColorCount { .. } => None,
        }
    }
}

impl From<PaletteError> for EngineError {
    fn from(err: PaletteError) -> Self {
        EngineError::Palette(err)
    }
}

impl From<RasterError> for EngineError {
    fn from(err: RasterError) -> Self {
        EngineError::Raster(err)
    }
}

impl From<ComposeError> for EngineError {
    fn from(err: ComposeError) -> Self {
        EngineError::Compose(err)
    }
}
