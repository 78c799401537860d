//! Tile library access.
//!
//! The mosaic core never touches the filesystem directly. It asks a
//! [`TileSource`] for the list of tile identifiers when the index is built,
//! and for a decoded image each time a tile is placed.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      TileIndex / MosaicCompositor       │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            TileSource Trait             │
//! └────────────────────┬────────────────────┘
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │  DirTileSource  │    │  MemoryTileSource   │
//! │  (directory)    │    │  (decoded images)   │
//! └─────────────────┘    └─────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::error::SourceError;

// =============================================================================
// TileSource Trait
// =============================================================================

/// Trait for resolving tile identifiers to decoded images.
///
/// Implementations are shared between concurrent requests, so they must be
/// `Send + Sync`. Every call is blocking.
pub trait TileSource: Send + Sync {
    /// List every tile identifier in the library, sorted.
    fn list_tiles(&self) -> Result<Vec<String>, SourceError>;

    /// Load and decode the tile stored under `id`.
    fn load_tile(&self, id: &str) -> Result<DynamicImage, SourceError>;
}

// =============================================================================
// DirTileSource
// =============================================================================

/// A tile library backed by a single directory.
///
/// Every regular file directly inside the directory is a candidate tile;
/// subdirectories are not searched. Identifiers are file names relative to
/// the directory. Hidden files (leading `.`) are ignored.
#[derive(Debug, Clone)]
pub struct DirTileSource {
    root: PathBuf,
}

impl DirTileSource {
    /// Create a source reading tiles from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the tile directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an identifier to a path inside the library.
    ///
    /// Identifiers that would escape the directory resolve to nothing.
    fn resolve(&self, id: &str) -> Option<PathBuf> {
        let name = Path::new(id);
        let mut components = name.components();
        match (components.next(), components.next()) {
            (Some(std::path::Component::Normal(_)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }
}

impl TileSource for DirTileSource {
    fn list_tiles(&self) -> Result<Vec<String>, SourceError> {
        let io_error = |e: std::io::Error| SourceError::Io {
            path: self.root.display().to_string(),
            message: e.to_string(),
        };

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!(path = %path.display(), "Skipping tile with non UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            ids.push(name);
        }

        ids.sort();
        Ok(ids)
    }

    fn load_tile(&self, id: &str) -> Result<DynamicImage, SourceError> {
        let path = self
            .resolve(id)
            .filter(|p| p.is_file())
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;

        let reader = ImageReader::open(&path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| SourceError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        reader.decode().map_err(|e| SourceError::Decode {
            id: id.to_string(),
            message: e.to_string(),
        })
    }
}

// =============================================================================
// MemoryTileSource
// =============================================================================

/// A tile library held entirely in memory.
///
/// Useful for embedding the mosaic builder without a tile directory, and for
/// tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryTileSource {
    tiles: BTreeMap<String, DynamicImage>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile, replacing any existing tile with the same identifier.
    pub fn with_tile(mut self, id: impl Into<String>, image: impl Into<DynamicImage>) -> Self {
        self.insert(id, image);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, image: impl Into<DynamicImage>) {
        self.tiles.insert(id.into(), image.into());
    }

    /// Drop a tile, so later loads of `id` fail with [`SourceError::NotFound`].
    pub fn remove(&mut self, id: &str) -> Option<DynamicImage> {
        self.tiles.remove(id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileSource for MemoryTileSource {
    fn list_tiles(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.tiles.keys().cloned().collect())
    }

    fn load_tile(&self, id: &str) -> Result<DynamicImage, SourceError> {
        self.tiles
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
