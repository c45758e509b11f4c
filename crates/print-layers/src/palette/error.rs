//! Error types for palette operations

use std::fmt;
use std::num::ParseIntError;

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 characters after stripping '#')
    InvalidLength,
    /// Invalid hexadecimal character encountered
    InvalidHex(ParseIntError),
}

impl From<ParseIntError> for ParseColorError {
    fn from(err: ParseIntError) -> Self {
        ParseColorError::InvalidHex(err)
    }
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::InvalidLength => {
                write!(f, "invalid hex color length (expected 3 or 6 characters)")
            }
            ParseColorError::InvalidHex(err) => {
                write!(f, "invalid hex character: {}", err)
            }
        }
    }
}

impl std::error::Error for ParseColorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseColorError::InvalidHex(err) => Some(err),
            _ => None,
        }
    }
}

/// Error type for palette construction and palette edits.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteError {
    /// No colors provided
    EmptyPalette,
    /// More colors than a `u8` label can address
    TooManyColors {
        /// Number of colors supplied
        len: usize,
    },
    /// Replacement palette does not match the current palette's length
    LengthMismatch {
        /// Length of the current palette
        expected: usize,
        /// Length of the replacement
        actual: usize,
    },
    /// Palette index out of range
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Palette length
        len: usize,
    },
    /// The paper entry cannot be merged away
    PaperEntry {
        /// Index of the paper entry
        index: usize,
    },
    /// A merge names the same entry twice
    MergeIntoSelf {
        /// Index given as both source and target
        index: usize,
    },
    /// A merge would leave fewer than two colors
    TooFewColors,
    /// Invalid hex color string
    ParseColor(ParseColorError),
}

impl From<ParseColorError> for PaletteError {
    fn from(err: ParseColorError) -> Self {
        PaletteError::ParseColor(err)
    }
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::EmptyPalette => write!(f, "palette cannot be empty"),
            PaletteError::TooManyColors { len } => {
                write!(f, "palette has {} colors (max {})", len, super::MAX_PALETTE_LEN)
            }
            PaletteError::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "palette length mismatch: expected {} colors, got {}",
                    expected, actual
                )
            }
            PaletteError::IndexOutOfRange { index, len } => {
                write!(f, "palette index {} out of range for {} colors", index, len)
            }
            PaletteError::PaperEntry { index } => {
                write!(f, "palette entry {} is the paper color and cannot be removed", index)
            }
            PaletteError::MergeIntoSelf { index } => {
                write!(f, "cannot merge palette entry {} into itself", index)
            }
            PaletteError::TooFewColors => write!(f, "palette must keep at least 2 colors"),
            PaletteError::ParseColor(err) => write!(f, "invalid color: {}", err),
        }
    }
}

impl std::error::Error for PaletteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaletteError::ParseColor(err) => Some(err),
            _ => None,
        }
    }
}
