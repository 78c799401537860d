//! Tile color index.
//!
//! The canonical [`TileIndex`] maps every tile identifier to its average
//! color. It is built once at startup and then only read. Each mosaic build
//! takes a [`WorkingIndex`] via [`TileIndex::snapshot`] and consumes entries
//! from it as tiles are placed, so no tile is used twice within one mosaic
//! and concurrent builds never see each other's consumption.
//!
//! Both maps are ordered by identifier. Iteration order is therefore
//! lexicographic, which is what makes nearest-color tie-breaking
//! deterministic.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::IndexError;
use crate::source::TileSource;

use super::color::{average_color, Color};

/// How to treat a tile file that cannot be decoded while building the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Log a warning and leave the tile out of the index.
    #[default]
    Skip,

    /// Abort the whole build.
    Fail,
}

// =============================================================================
// TileIndex
// =============================================================================

/// Immutable mapping from tile identifier to average color.
#[derive(Debug, Clone, Default)]
pub struct TileIndex {
    entries: BTreeMap<String, Color>,
}

impl TileIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index by decoding and averaging every tile in `source`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::LibraryUnreadable`] if the tiles cannot be listed
    /// - [`IndexError::TileUnreadable`] if a tile fails to decode and
    ///   `policy` is [`DecodePolicy::Fail`]
    /// - [`IndexError::Empty`] if no tile could be indexed
    pub fn build<S>(source: &S, policy: DecodePolicy) -> Result<Self, IndexError>
    where
        S: TileSource + ?Sized,
    {
        info!("Populating tile index...");
        let ids = source.list_tiles().map_err(IndexError::LibraryUnreadable)?;

        let mut index = Self::new();
        let mut skipped = 0usize;

        for id in ids {
            let image = match source.load_tile(&id) {
                Ok(image) => image,
                Err(e) if policy == DecodePolicy::Skip => {
                    warn!(tile = %id, "Skipping unreadable tile: {}", e);
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(IndexError::TileUnreadable(e)),
            };

            match average_color(&image.to_rgba16()) {
                Ok(color) => {
                    debug!(tile = %id, r = color.r, g = color.g, b = color.b, "Indexed tile");
                    index.insert(id, color);
                }
                Err(e) => {
                    // Zero-sized images decode fine but have no color
                    warn!(tile = %id, "Skipping tile: {}", e);
                    skipped += 1;
                }
            }
        }

        if index.is_empty() {
            return Err(IndexError::Empty);
        }

        info!(
            tiles = index.len(),
            skipped = skipped,
            "Finished populating tile index"
        );
        Ok(index)
    }

    /// Insert an entry, returning the previous color for `id` if any.
    pub fn insert(&mut self, id: impl Into<String>, color: Color) -> Option<Color> {
        self.entries.insert(id.into(), color)
    }

    /// Average color of a tile.
    pub fn get(&self, id: &str) -> Option<Color> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.entries.iter().map(|(id, c)| (id.as_str(), *c))
    }

    /// The lexicographically first identifier.
    pub fn first_id(&self) -> Option<&str> {
        self.entries.keys().next().map(String::as_str)
    }

    /// Take an independent, mutable copy for one mosaic build.
    pub fn snapshot(&self) -> WorkingIndex {
        WorkingIndex {
            entries: self.entries.clone(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Color)> for TileIndex {
    fn from_iter<T: IntoIterator<Item = (K, Color)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, c)| (k.into(), c)).collect(),
        }
    }
}

// =============================================================================
// WorkingIndex
// =============================================================================

/// Request-local copy of a [`TileIndex`] that shrinks as tiles are matched.
#[derive(Debug, Clone)]
pub struct WorkingIndex {
    entries: BTreeMap<String, Color>,
}

impl WorkingIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterate remaining entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.entries.iter().map(|(id, c)| (id.as_str(), *c))
    }

    /// Remove an entry so it cannot be matched again.
    pub fn remove(&mut self, id: &str) -> Option<Color> {
        self.entries.remove(id)
    }
}
