//! Pixel grids: color rasters and palette-index label maps.
//!
//! Both are stored row-major. A [`LabelMap`] is the expensive artifact of
//! quantization: once computed it lets the palette editor and the layer
//! composer work by index lookup alone.

mod error;
mod label_map;
mod raster;

pub use error::RasterError;
pub use label_map::LabelMap;
pub use raster::Raster;

/// Copy a row-major grid, mirrored left-right and/or top-bottom.
pub(crate) fn flip_grid<T: Copy>(
    data: &[T],
    width: usize,
    height: usize,
    horizontal: bool,
    vertical: bool,
) -> Vec<T> {
    let mut out = Vec::with_capacity(data.len());
    for y in 0..height {
        let src_y = if vertical { height - 1 - y } else { y };
        let row = &data[src_y * width..(src_y + 1) * width];
        if horizontal {
            out.extend(row.iter().rev());
        } else {
            out.extend_from_slice(row);
        }
    }
    out
}
