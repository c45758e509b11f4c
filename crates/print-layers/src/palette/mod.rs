//! Palette type and errors
//!
//! A palette is the ordered list of ink colors assigned to a project.
//! Label maps store indices into it, so its order is significant.

mod error;
mod palette;

pub use error::{PaletteError, ParseColorError};
pub use palette::{Palette, MAX_PALETTE_LEN};
