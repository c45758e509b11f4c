//! Error types for print order resolution

use std::fmt;

/// Error type for explicit print orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Order names an index the palette does not have
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Palette length
        len: usize,
    },
    /// Order names the same index more than once
    DuplicateIndex {
        /// Repeated index
        index: usize,
    },
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::IndexOutOfRange { index, len } => write!(
                f,
                "print order index {} out of range for palette of {} colors",
                index, len
            ),
            ComposeError::DuplicateIndex { index } => {
                write!(f, "print order lists index {} more than once", index)
            }
        }
    }
}

impl std::error::Error for ComposeError {}
