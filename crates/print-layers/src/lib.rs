#![allow(clippy::module_inception)]

//! print-layers: color reduction and layer decomposition for reduction prints
//!
//! A reduction print is made from a single block that is cut away a little
//! more before each ink pass. This library turns a photograph into the plan
//! for such a print: a small palette of flat inks, a per-pixel label map, the
//! order in which the inks are printed and a preview of the sheet after
//! every pass.
//!
//! # Quick Start
//!
//! ```
//! use print_layers::{compose, Quantizer, Raster, Rgb};
//!
//! let pixels = vec![
//!     Rgb::BLACK, Rgb::BLACK, Rgb::WHITE, Rgb::WHITE,
//!     Rgb::BLACK, Rgb::BLACK, Rgb::WHITE, Rgb::WHITE,
//! ];
//! let raster = Raster::new(4, 2, pixels).unwrap();
//!
//! let quantized = Quantizer::default().quantize(&raster, 2).unwrap();
//! let composition = compose(&quantized.palette, &quantized.labels, None).unwrap();
//!
//! assert_eq!(composition.layers.len(), 2);
//! assert_eq!(composition.layers[1].raster, quantized.raster);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! Raster --Quantizer--> Palette + LabelMap --replace_palette--> Raster
//!                             |
//!                             +--compose--> PrintOrder + Vec<Layer>
//! ```
//!
//! - [`flood_fill`] optionally clears a background region to paper white
//!   (or any flat color) before quantization.
//! - [`Quantizer`] clusters pixels into `color_count - 1` inks with seeded
//!   k-means and appends pure white as the paper color.
//! - [`assign_labels`] maps every pixel to its nearest palette entry by
//!   squared RGB distance, lowest index on ties.
//! - [`replace_palette`] and [`merge_entries`] edit colors through the
//!   stored label map without reclustering.
//! - [`compose`] derives the print order (ascending luminance, paper last)
//!   and renders the cumulative layers.
//!
//! Randomness is confined to the quantizer and driven by a fixed seed, so
//! every operation is deterministic for identical inputs.

pub mod assign;
pub mod color;
pub mod compose;
pub mod error;
pub mod fill;
pub mod palette;
pub mod quantize;
pub mod raster;
pub mod recolor;


pub use assign::assign_labels;
pub use color::Rgb;
pub use compose::{
    compose, default_order, resolve_print_order, ComposeError, Composition, Layer, PrintOrder,
};
pub use error::EngineError;
pub use fill::{flood_fill, flood_fill_to_white, Filled};
pub use palette::{Palette, PaletteError, ParseColorError, MAX_PALETTE_LEN};
pub use quantize::{
    simplify_labels, QuantizeOptions, Quantized, Quantizer, MIN_COLOR_COUNT, NEAR_WHITE,
};
pub use raster::{LabelMap, Raster, RasterError};
pub use recolor::{merge_entries, render_labels, replace_palette, Merged};
