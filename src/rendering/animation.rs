//! Animated preview of the printing sequence.
//!
//! The first frame is the blank sheet. Each following frame overlays one
//! cumulative layer with the paper color made transparent, so the viewer
//! watches the inks land pass by pass. Frames keep what lies beneath them.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use print_layers::{Raster, Rgb};

use crate::error::ProjectError;

/// Time each pass stays on screen
pub const FRAME_DELAY_MS: u32 = 500;
/// The finished print lingers before the loop restarts
pub const FINAL_FRAME_DELAY_MS: u32 = 1500;

/// Encode `layers` (in print order) as a looping GIF over a sheet of `paper`.
pub fn encode_progression(layers: &[Raster], paper: Rgb) -> Result<Vec<u8>, ProjectError> {
    let Some(first) = layers.first() else {
        return Err(ProjectError::MissingArtifact("layers"));
    };
    let (width, height) = (first.width() as u32, first.height() as u32);
    let sheet = RgbaImage::from_pixel(width, height, opaque(paper));

    let mut frames = Vec::with_capacity(layers.len() + 1);
    frames.push(Frame::from_parts(sheet, 0, 0, delay(FRAME_DELAY_MS)));
    for (i, layer) in layers.iter().enumerate() {
        let ms = if i + 1 == layers.len() {
            FINAL_FRAME_DELAY_MS
        } else {
            FRAME_DELAY_MS
        };
        frames.push(Frame::from_parts(overlay(layer, paper)?, 0, 0, delay(ms)));
    }

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buf, 10);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(frames)?;
    }
    tracing::debug!(width, height, frames = layers.len() + 1, bytes = buf.len(), "Encoded progression");
    Ok(buf)
}

fn overlay(layer: &Raster, paper: Rgb) -> Result<RgbaImage, ProjectError> {
    let bytes: Vec<u8> = layer
        .pixels()
        .iter()
        .flat_map(|&px| {
            let [r, g, b] = px.to_bytes();
            let alpha = if px == paper { 0 } else { 255 };
            [r, g, b, alpha]
        })
        .collect();
    RgbaImage::from_raw(layer.width() as u32, layer.height() as u32, bytes)
        .ok_or(ProjectError::MissingArtifact("layer pixels"))
}

fn opaque(color: Rgb) -> Rgba<u8> {
    let [r, g, b] = color.to_bytes();
    Rgba([r, g, b, 255])
}

fn delay(ms: u32) -> Delay {
    Delay::from_numer_denom_ms(ms, 1)
}
