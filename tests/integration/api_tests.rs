//! API integration tests for mosaic requests and error handling.
//!
//! Tests verify:
//! - Upload form, health check and both mosaic endpoints
//! - Error cases (missing image, bad tile size, garbage upload, oversize body)
//! - HTTP response codes and headers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::GenericImageView;
use tempfile::TempDir;
use tower::ServiceExt;

use tessera::{create_router, RouterConfig};

use super::test_utils::{
    create_service, create_tile_dir, is_valid_jpeg, mosaic_request, multipart_request,
    split_png, MultipartBody,
};

/// Router over the standard five-tile library, with request tracing off.
fn test_router(config: RouterConfig) -> (TempDir, Router) {
    let dir = create_tile_dir();
    let router = create_router(create_service(dir.path()), config.with_tracing(false));
    (dir, router)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn header<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

// =============================================================================
// Pages and Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_tile_count() {
    let (_dir, router) = test_router(RouterConfig::new());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["tiles"], 5);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_upload_form() {
    let (_dir, router) = test_router(RouterConfig::new().with_default_tile_size(12));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "content-type").starts_with("text/html"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains(r#"name="image""#));
    assert!(html.contains(r#"value="12""#));
    assert!(html.contains("5 tiles in library"));
}

// =============================================================================
// Mosaic API
// =============================================================================

#[tokio::test]
async fn test_api_returns_jpeg_mosaic() {
    let (_dir, router) = test_router(RouterConfig::new());

    let request = mosaic_request("/api/mosaic", &split_png(40, 20), Some("10"));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), "image/jpeg");
    assert_eq!(header(&response, "cache-control"), "no-store");

    // 4 x 2 grid over 5 tiles
    assert_eq!(header(&response, "x-mosaic-tile-size"), "10");
    assert_eq!(header(&response, "x-mosaic-blocks"), "8");
    assert_eq!(header(&response, "x-mosaic-matched"), "5");
    assert_eq!(header(&response, "x-mosaic-fallbacks"), "3");
    assert!(response.headers().contains_key("x-mosaic-duration-ms"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_jpeg(&body), "Response should be a valid JPEG");

    let mosaic = image::load_from_memory(&body).unwrap();
    assert_eq!(mosaic.dimensions(), (40, 20));
}

#[tokio::test]
async fn test_api_uses_default_tile_size() {
    let (_dir, router) = test_router(RouterConfig::new().with_default_tile_size(20));

    let request = mosaic_request("/api/mosaic", &split_png(40, 20), None);
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-mosaic-tile-size"), "20");
    assert_eq!(header(&response, "x-mosaic-blocks"), "2");
    assert_eq!(header(&response, "x-mosaic-fallbacks"), "0");
}

#[tokio::test]
async fn test_blank_tile_size_uses_default() {
    let (_dir, router) = test_router(RouterConfig::new().with_default_tile_size(20));

    let request = mosaic_request("/api/mosaic", &split_png(40, 20), Some(" "));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-mosaic-tile-size"), "20");
}

#[tokio::test]
async fn test_requests_do_not_share_used_tiles() {
    let (_dir, router) = test_router(RouterConfig::new());

    for _ in 0..3 {
        let request = mosaic_request("/api/mosaic", &split_png(40, 20), Some("10"));
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "x-mosaic-matched"), "5");
    }
}

// =============================================================================
// Results Page
// =============================================================================

#[tokio::test]
async fn test_results_page_embeds_both_images() {
    let (_dir, router) = test_router(RouterConfig::new());

    let request = mosaic_request("/mosaic", &split_png(40, 20), Some("10"));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(html.matches("data:image/jpeg;base64,").count(), 2);
    assert!(html.contains("photo.png"));
    assert!(html.contains("Tile size: 10 px"));
    assert!(html.contains("5 matched, 3 fallback"));
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_missing_image() {
    let (_dir, router) = test_router(RouterConfig::new());

    let body = MultipartBody::new().text("tile_size", "10").finish();
    let response = router
        .oneshot(multipart_request("/api/mosaic", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "missing_image");
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_invalid_tile_size_values() {
    for value in ["0", "-5", "ten"] {
        let (_dir, router) = test_router(RouterConfig::new());

        let request = mosaic_request("/api/mosaic", &split_png(40, 20), Some(value));
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "tile_size {:?} should be rejected",
            value
        );

        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_tile_size");
    }
}

#[tokio::test]
async fn test_tile_size_wider_than_image() {
    let (_dir, router) = test_router(RouterConfig::new());

    let request = mosaic_request("/api/mosaic", &split_png(40, 20), Some("41"));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_tile_size");
}

#[tokio::test]
async fn test_tile_size_equal_to_width_is_accepted() {
    let (_dir, router) = test_router(RouterConfig::new());

    let request = mosaic_request("/api/mosaic", &split_png(40, 20), Some("40"));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-mosaic-blocks"), "1");
}

#[tokio::test]
async fn test_tile_size_wider_than_fallback_tile() {
    let (_dir, router) = test_router(RouterConfig::new());

    // Library tiles are 40px wide; none can fill a 50px block
    let request = mosaic_request("/api/mosaic", &split_png(100, 50), Some("50"));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "tile_size_too_large");
    assert!(json["message"].as_str().unwrap().contains("40px"));
}

#[tokio::test]
async fn test_garbage_upload() {
    let (_dir, router) = test_router(RouterConfig::new());

    let request = mosaic_request("/api/mosaic", b"definitely not an image", Some("10"));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let json = body_json(response).await;
    assert_eq!(json["error"], "unsupported_format");
}

#[tokio::test]
async fn test_upload_over_limit() {
    let (_dir, router) = test_router(RouterConfig::new().with_max_upload_bytes(1024));

    let oversized = vec![0u8; 8 * 1024];
    let request = mosaic_request("/api/mosaic", &oversized, Some("10"));
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_mosaic_requires_post() {
    let (_dir, router) = test_router(RouterConfig::new());

    let request = Request::builder()
        .uri("/api/mosaic")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route() {
    let (_dir, router) = test_router(RouterConfig::new());

    let request = Request::builder()
        .uri("/tiles/0/0")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
