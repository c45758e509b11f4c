//! Test fixtures: small PNG images with known colors.

use print_layers::{Raster, Rgb};
use reduction_print::rendering::{decode_upload, encode_png};

pub const INK_RED: Rgb = Rgb::new(150, 20, 20);
pub const INK_BLUE: Rgb = Rgb::new(180, 200, 240);

/// 8x6 image: a black top row, red left half and pale blue right half below.
///
/// Three distinct colors, so quantizing to four colors reproduces them
/// exactly with white appended as paper. By pixel count the palette is
/// `[red, blue, black, white]`.
pub fn three_color_png() -> Vec<u8> {
    let (width, height) = (8, 6);
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| match (x, y) {
                (_, 0) => Rgb::BLACK,
                (x, _) if x < width / 2 => INK_RED,
                _ => INK_BLUE,
            })
        })
        .collect();
    encode(&Raster::new(width, height, pixels).unwrap())
}

/// Left half black, right half white.
pub fn black_white_png(width: usize, height: usize) -> Vec<u8> {
    let pixels = (0..height)
        .flat_map(|_| (0..width).map(move |x| if x < width / 2 { Rgb::BLACK } else { Rgb::WHITE }))
        .collect();
    encode(&Raster::new(width, height, pixels).unwrap())
}

/// Horizontal gradient with many distinct colors, forcing k-means.
pub fn gradient_png(width: usize, height: usize) -> Vec<u8> {
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                Rgb::new(
                    (x * 255 / width.max(1)) as u8,
                    (y * 255 / height.max(1)) as u8,
                    ((x + y) * 97 % 256) as u8,
                )
            })
        })
        .collect();
    encode(&Raster::new(width, height, pixels).unwrap())
}

pub fn encode(raster: &Raster) -> Vec<u8> {
    encode_png(raster).expect("encode fixture")
}

/// Decode a PNG response body back into a raster.
pub fn decode(bytes: &[u8]) -> Raster {
    decode_upload(bytes).expect("decode PNG")
}
