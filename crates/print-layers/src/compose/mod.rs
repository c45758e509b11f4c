//! Print order and cumulative layer composition.
//!
//! A reduction print is cut and printed in passes. The composer decides the
//! pass order (darkest first unless told otherwise, paper always last) and
//! renders what the sheet looks like after each pass.

mod error;
mod layers;
mod order;

pub use error::ComposeError;
pub use layers::{compose, Composition, Layer};
pub use order::{default_order, resolve_print_order, PrintOrder};
