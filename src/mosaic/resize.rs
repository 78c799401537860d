//! Integer-ratio nearest-pixel resizing.
//!
//! Tiles are shrunk by sampling every `ratio`-th source pixel, where
//! `ratio = source_width / target_width` (integer division). No filtering or
//! averaging is done. When the ratio does not divide the source evenly the
//! output is wider than `target_width`; the compositor clips it.

use image::{GenericImageView, Rgba, RgbaImage};

use crate::error::MosaicError;

/// Resize `image` so that its width is (approximately) `target_width`.
///
/// Output pixel `(i, j)` is source pixel `(i * ratio, j * ratio)`, narrowed
/// from 16 to 8 bits per channel by truncation. Output dimensions are the
/// source dimensions divided by `ratio`.
///
/// # Errors
///
/// - [`MosaicError::InvalidTileSize`] if `target_width` is zero
/// - [`MosaicError::TileTooSmall`] if the source is narrower than `target_width`
pub fn resize<I>(image: &I, target_width: u32) -> Result<RgbaImage, MosaicError>
where
    I: GenericImageView<Pixel = Rgba<u16>>,
{
    if target_width == 0 {
        return Err(MosaicError::InvalidTileSize { tile_size: 0 });
    }

    let (width, height) = image.dimensions();
    let ratio = width / target_width;
    if ratio == 0 {
        return Err(MosaicError::TileTooSmall {
            width,
            target: target_width,
        });
    }

    Ok(RgbaImage::from_fn(width / ratio, height / ratio, |i, j| {
        narrow(image.get_pixel(i * ratio, j * ratio))
    }))
}

#[inline]
fn narrow(pixel: Rgba<u16>) -> Rgba<u8> {
    Rgba(pixel.0.map(|c| (c >> 8) as u8))
}
