//! Mosaic service for orchestrating mosaic requests.
//!
//! The MosaicService is the entry point used by the HTTP handlers and the
//! `render` command. It owns:
//! - the canonical tile index (built once, shared read-only)
//! - the tile source used to load matched tiles
//! - the fallback tile identifier
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        MosaicService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                  render_bytes()                         │    │
//! │  │  1. Decode upload     3. Build mosaic (compositor)      │    │
//! │  │  2. Validate size     4. Return raster + stats          │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │           │
//! │           ▼                    ▼                    ▼           │
//! │    ┌───────────┐      ┌──────────────┐    ┌──────────────────┐  │
//! │    │   codec   │      │  TileIndex   │    │   TileSource     │  │
//! │    └───────────┘      └──────────────┘    └──────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::DynamicImage;
use tracing::{debug, info};

use crate::codec::decode_image;
use crate::error::{IndexError, MosaicError};
use crate::mosaic::{DecodePolicy, Mosaic, MosaicCompositor, MosaicStats, TileIndex};
use crate::source::TileSource;

// =============================================================================
// Render Output
// =============================================================================

/// Result of a mosaic request.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The decoded source image
    pub original: DynamicImage,

    /// The composited mosaic
    pub mosaic: DynamicImage,

    /// Build statistics
    pub stats: MosaicStats,

    /// Wall time spent decoding and compositing
    pub duration: Duration,
}

// =============================================================================
// Mosaic Service
// =============================================================================

/// Service holding the tile library and building mosaics on request.
///
/// The index is immutable after construction and shared behind an `Arc`.
/// Every call to [`render`](Self::render) takes its own snapshot, so the
/// service can be used from many threads at once without locking.
///
/// # Example
///
/// ```ignore
/// use tessera::service::MosaicService;
/// use tessera::source::DirTileSource;
/// use tessera::mosaic::DecodePolicy;
///
/// let service = MosaicService::from_source(
///     DirTileSource::new("tiles"),
///     DecodePolicy::Skip,
///     None,
/// )?;
///
/// let output = service.render_bytes(&upload, 16)?;
/// println!("{} blocks in {:?}", output.stats.blocks, output.duration);
/// ```
pub struct MosaicService<S: TileSource> {
    index: Arc<TileIndex>,
    tiles: Arc<S>,
    fallback: String,
}

impl<S: TileSource> MosaicService<S> {
    /// Create a service from an existing index.
    ///
    /// When `fallback` is `None` the lexicographically first tile is used.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Empty`] if the index has no entries
    /// - [`IndexError::UnknownFallback`] if `fallback` is not in the index
    pub fn new(index: TileIndex, tiles: S, fallback: Option<String>) -> Result<Self, IndexError> {
        let fallback = match fallback {
            Some(id) if index.contains(&id) => id,
            Some(id) => return Err(IndexError::UnknownFallback(id)),
            None => index.first_id().ok_or(IndexError::Empty)?.to_string(),
        };

        Ok(Self {
            index: Arc::new(index),
            tiles: Arc::new(tiles),
            fallback,
        })
    }

    /// Build the index from `tiles` and create a service around it.
    pub fn from_source(
        tiles: S,
        policy: DecodePolicy,
        fallback: Option<String>,
    ) -> Result<Self, IndexError> {
        let index = TileIndex::build(&tiles, policy)?;
        let service = Self::new(index, tiles, fallback)?;
        info!(fallback = %service.fallback, "Fallback tile selected");
        Ok(service)
    }

    /// Get the canonical tile index.
    pub fn index(&self) -> &TileIndex {
        &self.index
    }

    /// Get the tile source.
    pub fn tiles(&self) -> &S {
        &self.tiles
    }

    /// Get the fallback tile identifier.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Number of tiles in the canonical index.
    pub fn tile_count(&self) -> usize {
        self.index.len()
    }

    /// Build a mosaic from an already-decoded image.
    pub fn build(&self, image: &DynamicImage, tile_size: u32) -> Result<Mosaic, MosaicError> {
        let source = image.to_rgba16();
        MosaicCompositor::new(&self.index, self.tiles.as_ref(), &self.fallback)
            .build(&source, tile_size)
    }

    /// Build a mosaic from an already-decoded image, keeping the original.
    pub fn render(&self, image: DynamicImage, tile_size: u32) -> Result<RenderOutput, MosaicError> {
        let started = Instant::now();
        let mosaic = self.build(&image, tile_size)?;

        let duration = started.elapsed();
        debug!(
            tile_size,
            width = image.width(),
            height = image.height(),
            elapsed_ms = duration.as_millis() as u64,
            "Rendered mosaic"
        );

        Ok(RenderOutput {
            original: image,
            mosaic: DynamicImage::ImageRgba8(mosaic.image),
            stats: mosaic.stats,
            duration,
        })
    }

    /// Decode uploaded bytes and build a mosaic from them.
    pub fn render_bytes(&self, data: &[u8], tile_size: u32) -> Result<RenderOutput, MosaicError> {
        let started = Instant::now();
        let image = decode_image(data)?;

        let mut output = self.render(image, tile_size)?;
        output.duration = started.elapsed();
        Ok(output)
    }
}

// =============================================================================
// Tests
// =============================================================================
