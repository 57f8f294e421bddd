//! Validated crop extraction.
//!
//! Applies a region rectangle to a concrete image. Validation happens here,
//! not when coordinates are stored: the same rectangle may be valid on one
//! image and out of bounds on another.

use image::RgbaImage;
use thiserror::Error;

use crate::store::PixelRect;

/// Why a rectangle cannot be cropped from a given image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CropError {
    /// Min values must be less than max values on both axes.
    #[error("min values must be less than max values")]
    DegenerateRectangle,
    /// The rectangle reaches outside the image bounds.
    #[error("coordinates out of image bounds")]
    OutOfBounds,
    /// The resulting crop would have no area.
    #[error("resulting crop has no area")]
    EmptyArea,
}

/// Copies the sub-rectangle of `img` described by `rect`.
///
/// Checks, in order: degenerate rectangle, image bounds, empty area (a
/// redundant guard given the first check). On success the payload is exactly
/// `(max_x - min_x) x (max_y - min_y)` pixels copied from the source at its
/// original offset. Malformed input always yields an error value, never a
/// panic.
pub fn extract_crop(img: &RgbaImage, rect: PixelRect) -> Result<RgbaImage, CropError> {
    if rect.min_x >= rect.max_x || rect.min_y >= rect.max_y {
        return Err(CropError::DegenerateRectangle);
    }

    let (width, height) = img.dimensions();
    if rect.min_x < 0
        || rect.min_y < 0
        || rect.max_x as i64 > width as i64
        || rect.max_y as i64 > height as i64
    {
        return Err(CropError::OutOfBounds);
    }

    let crop_width = rect.width() as u32;
    let crop_height = rect.height() as u32;
    if crop_width == 0 || crop_height == 0 {
        return Err(CropError::EmptyArea);
    }

    Ok(image::imageops::crop_imm(
        img,
        rect.min_x as u32,
        rect.min_y as u32,
        crop_width,
        crop_height,
    )
    .to_image())
}
