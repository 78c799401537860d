//! Router configuration for the mosaic server.
//!
//! This module defines the HTTP routes and applies middleware for CORS,
//! request tracing and the upload size limit.
//!
//! # Route Structure
//!
//! ```text
//! /               - Upload form
//! /mosaic         - Build mosaic, HTML results (POST, multipart)
//! /api/mosaic     - Build mosaic, JPEG body (POST, multipart)
//! /health         - Health check
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tessera::server::routes::{create_router, RouterConfig};
//! use tessera::service::MosaicService;
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()])
//!     .with_max_upload_bytes(20 * 1024 * 1024);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, mosaic_api_handler, mosaic_page_handler, upload_handler, AppState,
    DEFAULT_TILE_SIZE,
};
use crate::codec::DEFAULT_JPEG_QUALITY;
use crate::service::MosaicService;
use crate::source::TileSource;

/// Default upload limit in bytes (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,

    /// JPEG quality for mosaic responses
    pub jpeg_quality: u8,

    /// Tile size used when a request omits it
    pub default_tile_size: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Uploads are limited to 10 MiB
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            default_tile_size: DEFAULT_TILE_SIZE,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Set the JPEG quality for responses.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set the tile size used when a request omits it.
    pub fn with_default_tile_size(mut self, tile_size: u32) -> Self {
        self.default_tile_size = tile_size;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `service` - The mosaic service holding the tile index
/// * `config` - Router configuration
pub fn create_router<S>(service: MosaicService<S>, config: RouterConfig) -> Router
where
    S: TileSource + 'static,
{
    let app_state = AppState::new(service)
        .with_jpeg_quality(config.jpeg_quality)
        .with_default_tile_size(config.default_tile_size);

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(upload_handler::<S>))
        .route("/health", get(health_handler::<S>))
        .route("/mosaic", post(mosaic_page_handler::<S>))
        .route("/api/mosaic", post(mosaic_api_handler::<S>))
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
