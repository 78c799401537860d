//! Mosaic compositing.
//!
//! The compositor walks the source image in `tile_size` steps. At every grid
//! point it samples the single source pixel there, matches it against a
//! request-local [`WorkingIndex`](super::index::WorkingIndex), loads and
//! resizes the winning tile, and copies it into the output raster.
//!
//! ```text
//! source ──► grid point ──► pixel color ──► find_nearest ──► load tile
//!                                                                │
//!   output raster ◄── copy block (clipped) ◄── resize ◄──────────┘
//! ```
//!
//! When the working index runs out (more blocks than tiles) the configured
//! fallback tile is used instead. A matched tile that fails to load or
//! resize is also replaced by the fallback.

use image::{GenericImageView, Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::error::MosaicError;
use crate::source::TileSource;

use super::color::Color;
use super::index::TileIndex;
use super::matcher::find_nearest;
use super::resize::resize;

/// Counters describing one mosaic build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MosaicStats {
    /// Grid points processed
    pub blocks: u32,

    /// Blocks filled by a nearest-color match
    pub matched: u32,

    /// Blocks filled by the fallback tile because the index was exhausted
    pub exhausted: u32,

    /// Matched tiles that failed to load and were replaced by the fallback
    pub recovered: u32,
}

/// A finished mosaic and its build statistics.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub image: RgbaImage,
    pub stats: MosaicStats,
}

/// Builds mosaics from a canonical tile index.
///
/// The compositor only borrows the index and tile source; it can be created
/// cheaply per request.
pub struct MosaicCompositor<'a, S: TileSource + ?Sized> {
    index: &'a TileIndex,
    tiles: &'a S,
    fallback: &'a str,
}

impl<'a, S: TileSource + ?Sized> MosaicCompositor<'a, S> {
    /// Create a compositor.
    ///
    /// # Arguments
    ///
    /// * `index` - Canonical tile index; never modified
    /// * `tiles` - Source used to load matched tiles
    /// * `fallback` - Identifier used once the index is exhausted
    pub fn new(index: &'a TileIndex, tiles: &'a S, fallback: &'a str) -> Self {
        Self {
            index,
            tiles,
            fallback,
        }
    }

    /// Build a mosaic of `source` with square blocks of `tile_size` pixels.
    ///
    /// # Errors
    ///
    /// - [`MosaicError::InvalidTileSize`] if `tile_size` is zero
    /// - [`MosaicError::EmptyImage`] if `source` has no pixels
    /// - [`MosaicError::TileSizeExceedsWidth`] if `tile_size` is wider than `source`
    /// - [`MosaicError::TileLoad`] / [`MosaicError::TileTooSmall`] if the
    ///   fallback tile is needed but cannot be used
    pub fn build<I>(&self, source: &I, tile_size: u32) -> Result<Mosaic, MosaicError>
    where
        I: GenericImageView<Pixel = Rgba<u16>>,
    {
        if tile_size == 0 {
            return Err(MosaicError::InvalidTileSize { tile_size });
        }
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(MosaicError::EmptyImage);
        }
        if tile_size > width {
            return Err(MosaicError::TileSizeExceedsWidth { tile_size, width });
        }

        let mut raster = RgbaImage::new(width, height);
        let mut working = self.index.snapshot();
        let mut fallback: Option<RgbaImage> = None;
        let mut stats = MosaicStats::default();

        let step = tile_size as usize;
        for y in (0..height).step_by(step) {
            for x in (0..width).step_by(step) {
                stats.blocks += 1;
                let target = Color::from_pixel(source.get_pixel(x, y));

                let matched = match find_nearest(&target, &mut working) {
                    Some(id) => {
                        stats.matched += 1;
                        match self.render_tile(&id, tile_size) {
                            Ok(tile) => Some(tile),
                            Err(e) => {
                                warn!(tile = %id, x, y, "Using fallback tile: {}", e);
                                stats.recovered += 1;
                                None
                            }
                        }
                    }
                    None => {
                        stats.exhausted += 1;
                        None
                    }
                };

                // The fallback is rendered at most once per build
                let tile = match matched {
                    Some(ref tile) => tile,
                    None => match fallback {
                        Some(ref tile) => tile,
                        None => fallback.insert(self.render_tile(self.fallback, tile_size)?),
                    },
                };

                copy_block(&mut raster, tile, x, y, tile_size);
            }
        }

        debug!(
            width,
            height,
            tile_size,
            blocks = stats.blocks,
            matched = stats.matched,
            exhausted = stats.exhausted,
            recovered = stats.recovered,
            "Mosaic built"
        );

        Ok(Mosaic {
            image: raster,
            stats,
        })
    }

    /// Load a tile and resize it to the block width.
    fn render_tile(&self, id: &str, tile_size: u32) -> Result<RgbaImage, MosaicError> {
        let image = self.tiles.load_tile(id)?;
        resize(&image.to_rgba16(), tile_size)
    }
}

/// Copy `tile` into `raster` with its top-left corner at `(x0, y0)`.
///
/// The copied area is clipped to the block, to the tile's own extent and to
/// the raster bounds. Pixels outside the tile are left untouched.
fn copy_block(raster: &mut RgbaImage, tile: &RgbaImage, x0: u32, y0: u32, tile_size: u32) {
    let w = tile_size.min(tile.width()).min(raster.width() - x0);
    let h = tile_size.min(tile.height()).min(raster.height() - y0);

    for dy in 0..h {
        for dx in 0..w {
            raster.put_pixel(x0 + dx, y0 + dy, *tile.get_pixel(dx, dy));
        }
    }
}
