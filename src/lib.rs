//! # Tessera
//!
//! A photo-mosaic server. Rebuilds uploaded images out of a library of small
//! tile images, choosing for every block of the source the unused tile whose
//! average color is closest.
//!
//! ## Features
//!
//! - **Tile index**: Average colors of every tile are computed once at startup
//! - **No repeats**: A tile is used at most once per mosaic, then a fallback
//!   tile fills the remaining blocks
//! - **Concurrent requests**: Each build works on its own snapshot of the index
//! - **Built-in web page**: Upload form and side-by-side results page
//! - **HTTP API**: `POST /api/mosaic` returns the mosaic as a JPEG
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`mosaic`] - Color averaging, tile index, matcher, resize and compositor
//! - [`source`] - Tile libraries (directory on disk or in memory)
//! - [`codec`] - Upload decoding and JPEG encoding
//! - [`service`] - Shared mosaic service used by the server and the CLI
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use tessera::{create_router, DecodePolicy, DirTileSource, MosaicService, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = MosaicService::from_source(
//!         DirTileSource::new("tiles"),
//!         DecodePolicy::Skip,
//!         None,
//!     )
//!     .expect("tile library");
//!
//!     let router = create_router(service, RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod mosaic;
pub mod server;
pub mod service;
pub mod source;

// Re-export commonly used types
pub use codec::{
    clamp_quality, decode_image, encode_jpeg, is_valid_quality, DEFAULT_JPEG_QUALITY,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use config::{Cli, Command, LibraryConfig, RenderConfig, ServeConfig};
pub use error::{IndexError, MosaicError, SourceError};
pub use mosaic::{
    average_color, find_nearest, resize, Color, DecodePolicy, Mosaic, MosaicCompositor,
    MosaicStats, TileIndex, WorkingIndex,
};
pub use server::{
    create_router, health_handler, mosaic_api_handler, mosaic_page_handler, upload_handler,
    AppState, ErrorResponse, HandlerError, HealthResponse, RouterConfig,
};
pub use service::{MosaicService, RenderOutput};
pub use source::{DirTileSource, MemoryTileSource, TileSource};
