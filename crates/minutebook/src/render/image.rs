//! Raster image decoding for signatures and watermarks.

use std::io::Cursor;

use image::ImageReader;

use crate::error::{Error, Result};

/// An image decoded to 8-bit RGB with an optional alpha plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Packed RGB samples, row-major.
    pub rgb: Vec<u8>,
    /// Alpha samples, present only when some pixel is not fully opaque.
    pub alpha: Option<Vec<u8>>,
}

/// Pixel dimensions of an encoded image without decoding the pixels.
///
/// # Errors
///
/// Returns an image decode error for unknown or corrupt formats.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::image_decode("embedded", e.to_string()))?
        .into_dimensions()
        .map_err(|e| Error::image_decode("embedded", e.to_string()))
}

/// Decode a PNG or JPEG image.
///
/// # Errors
///
/// Returns an image decode error for unknown or corrupt formats.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| Error::image_decode("embedded", e.to_string()))?
        .to_rgba8();
    let (width, height) = image.dimensions();

    let pixels = image.as_raw();
    let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
    let mut alpha = Vec::with_capacity(pixels.len() / 4);
    for pixel in pixels.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
        alpha.push(pixel[3]);
    }
    let translucent = alpha.iter().any(|&a| a < u8::MAX);

    Ok(DecodedImage {
        width,
        height,
        rgb,
        alpha: translucent.then_some(alpha),
    })
}
