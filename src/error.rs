use thiserror::Error;

/// Errors raised while resolving tiles from a tile library
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// No tile exists under the requested identifier
    #[error("Tile not found: {0}")]
    NotFound(String),

    /// The library or one of its files could not be read
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    /// The file exists but is not a decodable image
    #[error("Failed to decode tile {id}: {message}")]
    Decode { id: String, message: String },
}

/// Errors that prevent the tile index from being built.
///
/// These are startup failures: without an index the service cannot accept
/// mosaic requests.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// The tile directory itself could not be listed
    #[error("Cannot list tile library: {0}")]
    LibraryUnreadable(SourceError),

    /// A tile could not be decoded and the index is built in strict mode
    #[error("Unreadable tile in library: {0}")]
    TileUnreadable(SourceError),

    /// The library contains no usable tiles
    #[error("Tile library is empty: no decodable images found")]
    Empty,

    /// The configured fallback tile is not part of the index
    #[error("Fallback tile not found in index: {0}")]
    UnknownFallback(String),
}

/// Errors that can occur while building a mosaic
#[derive(Debug, Clone, Error)]
pub enum MosaicError {
    /// Tile size must be at least one pixel
    #[error("Invalid tile size: {tile_size} (must be at least 1)")]
    InvalidTileSize { tile_size: u32 },

    /// Tile size is larger than the source image is wide
    #[error("Tile size {tile_size} exceeds source image width {width}")]
    TileSizeExceedsWidth { tile_size: u32, width: u32 },

    /// Image has zero width or height
    #[error("Image has no pixels")]
    EmptyImage,

    /// Tile image is narrower than the block it must fill
    #[error("Tile is {width}px wide, too narrow for tile size {target}")]
    TileTooSmall { width: u32, target: u32 },

    /// The fallback tile could not be loaded
    #[error("Tile load error: {0}")]
    TileLoad(#[from] SourceError),

    /// Uploaded image could not be decoded
    #[error("Decode error: {message}")]
    DecodeError { message: String },

    /// Output image could not be encoded
    #[error("Encode error: {message}")]
    EncodeError { message: String },
}
