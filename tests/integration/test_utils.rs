//! Test utilities for integration tests.
//!
//! Helpers for building tile directories on disk, encoding test images and
//! assembling `multipart/form-data` request bodies by hand.

use std::io::Cursor;
use std::path::Path;

use axum::body::Body;
use axum::http::Request;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use tessera::mosaic::DecodePolicy;
use tessera::service::MosaicService;
use tessera::source::DirTileSource;

pub const BOUNDARY: &str = "tessera-test-boundary";

// =============================================================================
// Tile Libraries
// =============================================================================

/// Write a 40x40 solid-color PNG tile into `dir`.
pub fn write_tile(dir: &Path, name: &str, color: [u8; 3]) {
    RgbImage::from_pixel(40, 40, Rgb(color))
        .save(dir.join(name))
        .unwrap();
}

/// A tile directory with a few primary colors.
pub fn create_tile_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_tile(dir.path(), "black.png", [0, 0, 0]);
    write_tile(dir.path(), "blue.png", [0, 0, 255]);
    write_tile(dir.path(), "green.png", [0, 255, 0]);
    write_tile(dir.path(), "red.png", [255, 0, 0]);
    write_tile(dir.path(), "white.png", [255, 255, 255]);
    dir
}

/// Build a service over `dir` with default settings.
pub fn create_service(dir: &Path) -> MosaicService<DirTileSource> {
    MosaicService::from_source(DirTileSource::new(dir), DecodePolicy::Skip, None).unwrap()
}

// =============================================================================
// Images
// =============================================================================

/// Encode an RGB image in the given format.
pub fn encode(image: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

/// A `width x height` image split vertically: red on the left, blue on the right.
pub fn split_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    });
    encode(image, ImageFormat::Png)
}

/// Check for the JPEG SOI and EOI markers.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4 && data[..2] == [0xFF, 0xD8] && data[data.len() - 2..] == [0xFF, 0xD9]
}

// =============================================================================
// Multipart Bodies
// =============================================================================

/// Builder for `multipart/form-data` bodies.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// A POST request carrying a multipart body.
pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Upload `image` with an optional tile size.
pub fn mosaic_request(uri: &str, image: &[u8], tile_size: Option<&str>) -> Request<Body> {
    let mut body = MultipartBody::new();
    if let Some(tile_size) = tile_size {
        body = body.text("tile_size", tile_size);
    }
    let body = body.file("image", "photo.png", "image/png", image).finish();
    multipart_request(uri, body)
}
