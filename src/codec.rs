//! Image decoding and JPEG encoding.
//!
//! Uploaded images are decoded with format detection from their content, so
//! any format compiled into `image` is accepted. Mosaics and previews are
//! always encoded as JPEG.
//!
//! # Design Decisions
//!
//! - **Alpha is dropped on encode**: JPEG has no alpha channel. Pixels the
//!   compositor left uncovered are transparent black and encode as black.
//!
//! - **Quality control**: JPEG quality is configurable, clamped to 1-100.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};

use crate::error::MosaicError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Decode an in-memory image, detecting its format from the content.
///
/// # Errors
///
/// Returns [`MosaicError::DecodeError`] if the format is unknown or the data
/// is corrupt.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, MosaicError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| MosaicError::DecodeError {
            message: e.to_string(),
        })?;

    reader.decode().map_err(|e| MosaicError::DecodeError {
        message: e.to_string(),
    })
}

/// Encode an image as JPEG at the given quality.
///
/// Quality is clamped to the valid range.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Bytes, MosaicError> {
    let quality = clamp_quality(quality);
    let rgb = image.to_rgb8();

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| MosaicError::EncodeError {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output))
}

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
