//! Utility functions for image decoding and conversion.
//!
//! Extractors receive raw bytes from the service layer. Decoding happens
//! here so both families reject unreadable input the same way.

use crate::core::errors::{InferenceError, InferenceResult};
use image::{DynamicImage, GrayImage, RgbImage};
use std::path::Path;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Converts a DynamicImage to a GrayImage.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Decodes an encoded image held in memory.
///
/// The format is guessed from the content. Empty payloads and payloads larger
/// than `max_bytes` are rejected before decoding is attempted.
///
/// # Errors
///
/// Returns [`InferenceError::ImageDecode`] when the payload is empty, too
/// large, or not a decodable image.
pub fn decode_image(bytes: &[u8], max_bytes: usize) -> InferenceResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(InferenceError::image_decode("image payload is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(InferenceError::image_decode(format!(
            "image payload is {} bytes, limit is {} bytes",
            bytes.len(),
            max_bytes
        )));
    }
    let img = image::load_from_memory(bytes).map_err(InferenceError::image_decode_with)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(InferenceError::image_decode(format!(
            "image has zero area ({}x{})",
            img.width(),
            img.height()
        )));
    }
    Ok(img)
}

/// Reads an image file into memory without decoding it.
pub fn load_image_bytes(path: &Path) -> InferenceResult<Vec<u8>> {
    Ok(std::fs::read(path)?)
}
