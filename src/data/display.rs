use std::path::Path;

use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2};

use super::cube::value_range;
use crate::error::{Error, Result};

/// Added to a plane's value range so a constant plane does not divide by zero.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Linearly rescale a band plane to `0..=255` using its own min/max.
///
/// Non-finite samples map to 0. The output keeps the `[row, column]` shape.
pub fn normalize_band(plane: ArrayView2<'_, f32>) -> Array2<u8> {
    let Some((min, max)) = value_range(plane.iter()) else {
        return Array2::zeros(plane.dim());
    };
    let scale = max - min + NORMALIZE_EPSILON;
    plane.mapv(|v| if v.is_finite() { ((v - min) / scale * 255.0) as u8 } else { 0 })
}

/// Convert a `[row, column]` grayscale array to an image (`(x, y)` pixels).
pub fn to_gray_image(pixels: &Array2<u8>) -> GrayImage {
    let (height, width) = pixels.dim();
    let mut img = GrayImage::new(width as u32, height as u32);
    for ((y, x), &v) in pixels.indexed_iter() {
        img.put_pixel(x as u32, y as u32, Luma([v]));
    }
    img
}

/// Save a normalized band as PNG.
pub fn save_band_png(pixels: &Array2<u8>, path: &Path) -> Result<()> {
    to_gray_image(pixels)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })
}
