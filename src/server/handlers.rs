//! HTTP request handlers for the mosaic API.
//!
//! # Endpoints
//!
//! - `GET /` - Upload form
//! - `POST /mosaic` - Build a mosaic, respond with an HTML results page
//! - `POST /api/mosaic` - Build a mosaic, respond with the JPEG itself
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::codec::encode_jpeg;
use crate::error::MosaicError;
use crate::service::{MosaicService, RenderOutput};
use crate::source::TileSource;

use super::pages::{results_page, upload_page, ResultsView};

/// Default tile size when the form leaves it empty.
pub const DEFAULT_TILE_SIZE: u32 = 20;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the mosaic service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: TileSource> {
    /// The mosaic service holding the tile index
    pub service: Arc<MosaicService<S>>,

    /// JPEG quality for encoded mosaics and previews
    pub jpeg_quality: u8,

    /// Tile size used when a request does not specify one
    pub default_tile_size: u32,
}

impl<S: TileSource> AppState<S> {
    /// Create a new application state with default encoding settings.
    pub fn new(service: MosaicService<S>) -> Self {
        Self::with_shared_service(Arc::new(service))
    }

    /// Create a new application state around a shared service.
    pub fn with_shared_service(service: Arc<MosaicService<S>>) -> Self {
        Self {
            service,
            jpeg_quality: crate::codec::DEFAULT_JPEG_QUALITY,
            default_tile_size: DEFAULT_TILE_SIZE,
        }
    }

    /// Set the JPEG quality used for responses.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set the tile size used when a request omits it.
    pub fn with_default_tile_size(mut self, tile_size: u32) -> Self {
        self.default_tile_size = tile_size;
        self
    }
}

impl<S: TileSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            jpeg_quality: self.jpeg_quality,
            default_tile_size: self.default_tile_size,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Fields read from a mosaic upload form.
///
/// Extracted from a `multipart/form-data` body with fields:
/// - `image`: the source image file (required)
/// - `tile_size`: block size in pixels (optional)
#[derive(Debug)]
pub struct MosaicUpload {
    /// Client-side file name, if the browser sent one
    pub filename: Option<String>,

    /// Raw uploaded image bytes
    pub image: Bytes,

    /// Requested tile size in pixels
    pub tile_size: u32,
}

impl MosaicUpload {
    /// Read the upload form, applying `default_tile_size` when the field is
    /// missing or blank.
    pub async fn from_multipart(
        mut multipart: Multipart,
        default_tile_size: u32,
    ) -> Result<Self, HandlerError> {
        let mut filename = None;
        let mut image = None;
        let mut tile_size = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("image") => {
                    filename = field.file_name().map(str::to_string);
                    image = Some(field.bytes().await?);
                }
                Some("tile_size") => {
                    let text = field.text().await?;
                    tile_size = parse_tile_size(&text)?;
                }
                other => {
                    debug!(field = ?other, "Ignoring unknown form field");
                }
            }
        }

        let image = image
            .filter(|data| !data.is_empty())
            .ok_or_else(|| HandlerError::bad_request("missing_image", "No image was uploaded"))?;

        Ok(Self {
            filename,
            image,
            tile_size: tile_size.unwrap_or(default_tile_size),
        })
    }
}

/// Parse the `tile_size` form value.
///
/// Blank means "use the default"; anything else must be a positive integer.
fn parse_tile_size(text: &str) -> Result<Option<u32>, HandlerError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    match text.parse::<u32>() {
        Ok(0) | Err(_) => Err(HandlerError::bad_request(
            "invalid_tile_size",
            format!("Invalid tile size: {:?} (must be a positive integer)", text),
        )),
        Ok(size) => Ok(Some(size)),
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "invalid_tile_size", "decode_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Number of tiles in the index
    pub tiles: usize,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Build a JSON error response, logging by severity:
/// - 4xx errors are logged at WARN level (client errors)
/// - 5xx errors are logged at ERROR level (server errors)
fn error_response(status: StatusCode, error_type: &str, message: String) -> Response {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else if status.is_client_error() {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }

    let body = ErrorResponse::with_status(error_type, message, status);
    (status, Json(body)).into_response()
}

/// Convert MosaicError to HTTP response.
impl IntoResponse for MosaicError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            // 400 Bad Request - Invalid parameters
            MosaicError::InvalidTileSize { .. } => (StatusCode::BAD_REQUEST, "invalid_tile_size"),
            MosaicError::TileSizeExceedsWidth { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_tile_size")
            }
            MosaicError::EmptyImage => (StatusCode::BAD_REQUEST, "empty_image"),
            // The fallback tile cannot cover blocks this wide
            MosaicError::TileTooSmall { .. } => (StatusCode::BAD_REQUEST, "tile_size_too_large"),

            // 415 Unsupported Media Type - upload is not an image we can read
            MosaicError::DecodeError { .. } => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_format")
            }

            // 500 Internal Server Error - tile library and encoding failures
            MosaicError::TileLoad(_) => (StatusCode::INTERNAL_SERVER_ERROR, "tile_error"),
            MosaicError::EncodeError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
        };

        error_response(status, error_type, self.to_string())
    }
}

/// Errors produced by the HTTP handlers.
#[derive(Debug)]
pub enum HandlerError {
    /// Mosaic build failed
    Mosaic(MosaicError),

    /// The multipart body could not be read (includes oversize uploads)
    Upload(MultipartError),

    /// A form field had an invalid value
    BadRequest {
        error: &'static str,
        message: String,
    },

    /// The blocking build task panicked or was cancelled
    Internal(String),
}

impl HandlerError {
    pub fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        HandlerError::BadRequest {
            error,
            message: message.into(),
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Mosaic(err) => err.into_response(),
            HandlerError::Upload(err) => {
                let status = err.status();
                let error_type = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "payload_too_large"
                } else {
                    "invalid_upload"
                };
                error_response(status, error_type, err.body_text())
            }
            HandlerError::BadRequest { error, message } => {
                error_response(StatusCode::BAD_REQUEST, error, message)
            }
            HandlerError::Internal(message) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        }
    }
}

impl From<MosaicError> for HandlerError {
    fn from(err: MosaicError) -> Self {
        HandlerError::Mosaic(err)
    }
}

impl From<MultipartError> for HandlerError {
    fn from(err: MultipartError) -> Self {
        HandlerError::Upload(err)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Run a mosaic build off the async runtime.
async fn run_build<S>(state: &AppState<S>, upload: &MosaicUpload) -> Result<RenderOutput, HandlerError>
where
    S: TileSource + 'static,
{
    let service = Arc::clone(&state.service);
    let data = upload.image.clone();
    let tile_size = upload.tile_size;

    let output = tokio::task::spawn_blocking(move || service.render_bytes(&data, tile_size))
        .await
        .map_err(|e| HandlerError::Internal(format!("Mosaic task failed: {}", e)))??;

    info!(
        filename = upload.filename.as_deref().unwrap_or("<unnamed>"),
        tile_size = upload.tile_size,
        blocks = output.stats.blocks,
        exhausted = output.stats.exhausted,
        elapsed_ms = output.duration.as_millis() as u64,
        "Mosaic request complete"
    );

    Ok(output)
}

/// Handle the upload form.
///
/// # Endpoint
///
/// `GET /`
pub async fn upload_handler<S: TileSource>(State(state): State<AppState<S>>) -> Html<String> {
    Html(upload_page(state.default_tile_size, state.service.tile_count()))
}

/// Handle mosaic requests from the upload form.
///
/// # Endpoint
///
/// `POST /mosaic` with a `multipart/form-data` body
///
/// # Response
///
/// `200 OK` with an HTML page showing the original and the mosaic side by
/// side, both embedded as base64 JPEG data URIs.
///
/// # Errors
///
/// - `400 Bad Request`: Missing image or invalid tile size
/// - `413 Payload Too Large`: Upload exceeds the body limit
/// - `415 Unsupported Media Type`: Upload is not a decodable image
/// - `500 Internal Server Error`: Tile library or encoding error
pub async fn mosaic_page_handler<S: TileSource + 'static>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<Html<String>, HandlerError> {
    let upload = MosaicUpload::from_multipart(multipart, state.default_tile_size).await?;
    let output = run_build(&state, &upload).await?;

    let original = encode_jpeg(&output.original, state.jpeg_quality)?;
    let mosaic = encode_jpeg(&output.mosaic, state.jpeg_quality)?;

    let view = ResultsView {
        filename: upload.filename.as_deref(),
        tile_size: upload.tile_size,
        original_base64: general_purpose::STANDARD.encode(&original),
        mosaic_base64: general_purpose::STANDARD.encode(&mosaic),
        duration: output.duration,
        stats: output.stats,
    };

    Ok(Html(results_page(&view)))
}

/// Handle mosaic API requests.
///
/// # Endpoint
///
/// `POST /api/mosaic` with a `multipart/form-data` body
///
/// # Response
///
/// `200 OK` with the mosaic as `image/jpeg`, plus headers:
/// - `X-Mosaic-Tile-Size`: tile size used
/// - `X-Mosaic-Blocks`: grid points processed
/// - `X-Mosaic-Matched`: blocks filled by a nearest-color match
/// - `X-Mosaic-Fallbacks`: blocks filled by the fallback tile
/// - `X-Mosaic-Duration-Ms`: build time
pub async fn mosaic_api_handler<S: TileSource + 'static>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<Response, HandlerError> {
    let upload = MosaicUpload::from_multipart(multipart, state.default_tile_size).await?;
    let output = run_build(&state, &upload).await?;

    let jpeg = encode_jpeg(&output.mosaic, state.jpeg_quality)?;
    let fallbacks = output.stats.exhausted + output.stats.recovered;

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        [
            ("X-Mosaic-Tile-Size", upload.tile_size.to_string()),
            ("X-Mosaic-Blocks", output.stats.blocks.to_string()),
            ("X-Mosaic-Matched", output.stats.matched.to_string()),
            ("X-Mosaic-Fallbacks", fallbacks.to_string()),
            (
                "X-Mosaic-Duration-Ms",
                output.duration.as_millis().to_string(),
            ),
        ],
        jpeg,
    );

    Ok(response.into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "tiles": 128
/// }
/// ```
pub async fn health_handler<S: TileSource>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tiles: state.service.tile_count(),
    })
}

// =============================================================================
// Tests
// =============================================================================
