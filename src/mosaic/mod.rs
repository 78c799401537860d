//! Mosaic construction.
//!
//! This module holds the algorithmic core: everything between a decoded
//! source image and a composited output raster.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            MosaicCompositor             │
//! │  (grid walk, sampling, block copy)      │
//! └──────┬──────────────┬───────────────┬───┘
//!        │              │               │
//!        ▼              ▼               ▼
//! ┌─────────────┐ ┌────────────┐ ┌────────────┐
//! │find_nearest │ │  resize    │ │ TileSource │
//! │(WorkingIdx) │ │ (nearest   │ │ (load tile)│
//! └──────┬──────┘ │  pixel)    │ └────────────┘
//!        │        └────────────┘
//!        ▼
//! ┌─────────────────────────────────────────┐
//! │  TileIndex (canonical, built once)      │
//! │  snapshot() ──► WorkingIndex per build  │
//! └──────────────────┬──────────────────────┘
//!                    │
//!                    ▼
//!             average_color
//! ```
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage, ImageBuffer};
//! use tessera::mosaic::{DecodePolicy, MosaicCompositor, TileIndex};
//! use tessera::source::MemoryTileSource;
//!
//! let tiles = MemoryTileSource::new()
//!     .with_tile("red", RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255])))
//!     .with_tile("blue", RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])));
//! let index = TileIndex::build(&tiles, DecodePolicy::Skip).unwrap();
//!
//! let source: ImageBuffer<Rgba<u16>, Vec<u16>> =
//!     ImageBuffer::from_pixel(16, 16, Rgba([65535, 0, 0, 65535]));
//!
//! let mosaic = MosaicCompositor::new(&index, &tiles, "red")
//!     .build(&source, 4)
//!     .unwrap();
//! assert_eq!(mosaic.image.dimensions(), (16, 16));
//! assert_eq!(mosaic.stats.blocks, 16);
//! ```

mod color;
mod compositor;
mod index;
mod matcher;
mod resize;

pub use color::{average_color, Color};
pub use compositor::{Mosaic, MosaicCompositor, MosaicStats};
pub use index::{DecodePolicy, TileIndex, WorkingIndex};
pub use matcher::find_nearest;
pub use resize::resize;
