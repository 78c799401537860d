//! Tile library integration tests.
//!
//! Tests verify:
//! - Indexing a directory on disk (hidden files, subdirectories, corrupt files)
//! - Skip vs strict decode policy
//! - Fallback selection and recovery from tiles that vanish after indexing

use image::{GenericImageView, Rgb, RgbImage, Rgba};

use tessera::error::IndexError;
use tessera::mosaic::{DecodePolicy, TileIndex};
use tessera::service::MosaicService;
use tessera::source::{DirTileSource, TileSource};

use super::test_utils::{create_service, create_tile_dir, write_tile};

// =============================================================================
// Indexing
// =============================================================================

#[test]
fn test_index_directory() {
    let dir = create_tile_dir();
    let index = TileIndex::build(&DirTileSource::new(dir.path()), DecodePolicy::Skip).unwrap();

    assert_eq!(index.len(), 5);
    assert_eq!(index.first_id(), Some("black.png"));

    let red = index.get("red.png").unwrap();
    assert_eq!((red.r, red.g, red.b), (65535.0, 0.0, 0.0));
}

#[test]
fn test_hidden_files_and_subdirectories_are_ignored() {
    let dir = create_tile_dir();
    write_tile(dir.path(), ".hidden.png", [1, 2, 3]);
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    write_tile(&dir.path().join("nested"), "deep.png", [4, 5, 6]);

    let source = DirTileSource::new(dir.path());
    let ids = source.list_tiles().unwrap();
    assert_eq!(
        ids,
        vec!["black.png", "blue.png", "green.png", "red.png", "white.png"]
    );
}

#[test]
fn test_corrupt_tile_skipped_by_default() {
    let dir = create_tile_dir();
    std::fs::write(dir.path().join("broken.jpg"), b"not really a jpeg").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"tile credits").unwrap();

    let index = TileIndex::build(&DirTileSource::new(dir.path()), DecodePolicy::Skip).unwrap();
    assert_eq!(index.len(), 5);
    assert!(!index.contains("broken.jpg"));
    assert!(!index.contains("notes.txt"));
}

#[test]
fn test_corrupt_tile_fails_in_strict_mode() {
    let dir = create_tile_dir();
    std::fs::write(dir.path().join("broken.jpg"), b"not really a jpeg").unwrap();

    let result = TileIndex::build(&DirTileSource::new(dir.path()), DecodePolicy::Fail);
    assert!(matches!(result, Err(IndexError::TileUnreadable(_))));
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();

    let result = TileIndex::build(&DirTileSource::new(dir.path()), DecodePolicy::Skip);
    assert!(matches!(result, Err(IndexError::Empty)));
}

#[test]
fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let result = TileIndex::build(&DirTileSource::new(missing), DecodePolicy::Skip);
    assert!(matches!(result, Err(IndexError::LibraryUnreadable(_))));
}

// =============================================================================
// Service
// =============================================================================

#[test]
fn test_default_fallback_is_first_tile() {
    let dir = create_tile_dir();
    let service = create_service(dir.path());
    assert_eq!(service.fallback(), "black.png");
    assert_eq!(service.tile_count(), 5);
}

#[test]
fn test_unknown_fallback_rejected() {
    let dir = create_tile_dir();
    let result = MosaicService::from_source(
        DirTileSource::new(dir.path()),
        DecodePolicy::Skip,
        Some("purple.png".to_string()),
    );
    assert!(matches!(result, Err(IndexError::UnknownFallback(id)) if id == "purple.png"));
}

#[test]
fn test_render_from_directory() {
    let dir = create_tile_dir();
    let service = MosaicService::from_source(
        DirTileSource::new(dir.path()),
        DecodePolicy::Skip,
        Some("white.png".to_string()),
    )
    .unwrap();

    // Two green blocks side by side, then the library has no green left
    let source = RgbImage::from_pixel(20, 10, Rgb([0, 255, 0]));
    let output = service.render(source.into(), 10).unwrap();

    assert_eq!(output.stats.blocks, 2);
    assert_eq!(output.stats.matched, 2);
    assert_eq!(output.stats.exhausted, 0);
    assert_eq!(output.mosaic.dimensions(), (20, 10));
    assert_eq!(output.mosaic.get_pixel(0, 0), Rgba([0, 255, 0, 255]));
    // Second-nearest to pure green among the remaining tiles
    assert_ne!(output.mosaic.get_pixel(10, 0), Rgba([0, 255, 0, 255]));
}

#[test]
fn test_vanished_tile_is_replaced_by_fallback() {
    let dir = tempfile::tempdir().unwrap();
    write_tile(dir.path(), "blue.png", [0, 0, 255]);
    write_tile(dir.path(), "red.png", [255, 0, 0]);

    let service = MosaicService::from_source(
        DirTileSource::new(dir.path()),
        DecodePolicy::Skip,
        Some("blue.png".to_string()),
    )
    .unwrap();

    std::fs::remove_file(dir.path().join("red.png")).unwrap();

    let source = RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]));
    let output = service.render(source.into(), 10).unwrap();

    assert_eq!(output.stats.blocks, 1);
    assert_eq!(output.stats.matched, 1);
    assert_eq!(output.stats.recovered, 1);
    assert_eq!(output.mosaic.get_pixel(5, 5), Rgba([0, 0, 255, 255]));
}
