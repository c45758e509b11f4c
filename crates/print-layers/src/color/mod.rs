//! Color type and helpers
//!
//! All engine math happens on 8-bit RGB triples. Distances are plain
//! squared Euclidean distances in RGB; luminance is the Rec. 601 weighted
//! sum used only to derive the default print order.
//!
//! # Example
//!
//! ```
//! use print_layers::Rgb;
//!
//! let ink: Rgb = "#1a1a2e".parse().unwrap();
//! assert!(ink.luminance() < Rgb::WHITE.luminance());
//! ```

mod rgb;

pub use rgb::Rgb;
