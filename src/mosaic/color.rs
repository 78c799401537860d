//! Average color computation and color distance.
//!
//! Colors are kept in the 16-bit channel range that `image` produces for
//! `Rgba<u16>` pixels, so an 8-bit value `v` shows up here as `v * 257`.
//! Channels are pre-multiplied by alpha before averaging and matching, so a
//! fully transparent pixel counts as black.

use image::{GenericImageView, Rgba};

use crate::error::MosaicError;

/// Mean (or sampled) red, green and blue channel values, alpha pre-multiplied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Take the color channels of a straight-alpha 16-bit pixel,
    /// pre-multiplied by its alpha.
    ///
    /// Each channel becomes `c * a / 0xffff` with integer division.
    pub fn from_pixel(pixel: Rgba<u16>) -> Self {
        let [r, g, b, a] = pixel.0;
        let a = u32::from(a);
        let premultiply = |c: u16| f64::from(u32::from(c) * a / 0xffff);
        Self::new(premultiply(r), premultiply(g), premultiply(b))
    }

    /// Sum of per-channel absolute differences.
    ///
    /// Each term is computed as `sqrt(d * d)`, which equals `|d|` for finite
    /// channel values.
    pub fn distance(&self, other: &Color) -> f64 {
        sq(other.r - self.r).sqrt() + sq(other.g - self.g).sqrt() + sq(other.b - self.b).sqrt()
    }
}

#[inline]
fn sq(n: f64) -> f64 {
    n * n
}

/// Arithmetic mean of every pixel's color channels.
///
/// Returns [`MosaicError::EmptyImage`] for an image with zero width or height.
pub fn average_color<I>(image: &I) -> Result<Color, MosaicError>
where
    I: GenericImageView<Pixel = Rgba<u16>>,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(MosaicError::EmptyImage);
    }

    let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
    for (_, _, pixel) in image.pixels() {
        let c = Color::from_pixel(pixel);
        r += c.r;
        g += c.g;
        b += c.b;
    }

    let total = f64::from(width) * f64::from(height);
    Ok(Color::new(r / total, g / total, b / total))
}
