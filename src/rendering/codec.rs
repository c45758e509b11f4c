//! Image codec boundary: uploads in, PNG artifacts out.

use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use print_layers::Raster;
use std::io::Cursor;
use std::path::Path;

use crate::error::ProjectError;
use crate::models::CropRect;

/// Decode an uploaded image (any supported format), apply its EXIF
/// orientation and flatten it to 8-bit RGB.
pub fn decode_upload(bytes: &[u8]) -> Result<Raster, ProjectError> {
    let invalid = |e: image::ImageError| ProjectError::InvalidUpload(e.to_string());

    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let mut decoder = reader.into_decoder().map_err(invalid)?;
    let orientation = decoder.orientation().map_err(invalid)?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(invalid)?;
    image.apply_orientation(orientation);

    let rgb = image.to_rgb8();
    tracing::debug!(width = rgb.width(), height = rgb.height(), "Decoded upload");
    image_to_raster(rgb)
}

/// Read a stored PNG artifact back into a raster.
pub fn read_png(path: &Path) -> Result<Raster, ProjectError> {
    let image = image::open(path)?;
    image_to_raster(image.to_rgb8())
}

/// Encode a raster as an 8-bit RGB PNG.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, ProjectError> {
    let (width, height) = dimensions_u32(raster)?;
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ProjectError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(&raster.to_rgb_bytes())
            .map_err(|e| ProjectError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Cut `rect` out of `raster`. The rectangle must already be validated.
pub fn crop(raster: &Raster, rect: CropRect) -> Result<Raster, ProjectError> {
    let image = raster_to_image(raster)?;
    let cropped = image::imageops::crop_imm(&image, rect.x, rect.y, rect.width, rect.height);
    image_to_raster(cropped.to_image())
}

fn image_to_raster(image: RgbImage) -> Result<Raster, ProjectError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ProjectError::InvalidUpload("image has no pixels".into()));
    }
    Ok(Raster::from_rgb_bytes(
        width as usize,
        height as usize,
        image.as_raw(),
    )?)
}

fn raster_to_image(raster: &Raster) -> Result<RgbImage, ProjectError> {
    let (width, height) = dimensions_u32(raster)?;
    RgbImage::from_raw(width, height, raster.to_rgb_bytes())
        .ok_or_else(|| ProjectError::InvalidUpload("pixel buffer does not match dimensions".into()))
}

fn dimensions_u32(raster: &Raster) -> Result<(u32, u32), ProjectError> {
    let too_large = || ProjectError::InvalidUpload("image dimensions exceed u32".into());
    Ok((
        u32::try_from(raster.width()).map_err(|_| too_large())?,
        u32::try_from(raster.height()).map_err(|_| too_large())?,
    ))
}
