//! Configuration management for tessera.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap (`serve` and `render` subcommands)
//! - Environment variables with `TESSERA_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `TESSERA_TILES_DIR` - Directory of tile images (required)
//! - `TESSERA_FALLBACK_TILE` - Tile used once the index is exhausted (default: first tile)
//! - `TESSERA_STRICT_INDEX` - Fail startup on an undecodable tile (default: false)
//! - `TESSERA_HOST` - Server bind address (default: 127.0.0.1)
//! - `TESSERA_PORT` - Server port (default: 8080)
//! - `TESSERA_TILE_SIZE` - Tile size when a request omits it (default: 20)
//! - `TESSERA_JPEG_QUALITY` - JPEG quality of responses (default: 75)
//! - `TESSERA_MAX_UPLOAD_BYTES` - Upload size limit (default: 10 MiB)
//! - `TESSERA_CORS_ORIGINS` - Allowed CORS origins, comma separated

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::codec::{is_valid_quality, DEFAULT_JPEG_QUALITY};
use crate::mosaic::DecodePolicy;
use crate::server::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TILE_SIZE};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// CLI Arguments
// =============================================================================

/// tessera - A photo-mosaic server.
///
/// Rebuilds images out of a library of small tile images, matching every
/// block of the source to the tile with the closest average color.
#[derive(Parser, Debug, Clone)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Consume the parsed arguments and return the selected command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP server.
    Serve(ServeConfig),

    /// Build a single mosaic from a file and write it to disk.
    Render(RenderConfig),
}

/// Options shared by every command that needs the tile library.
#[derive(Args, Debug, Clone)]
pub struct LibraryConfig {
    /// Directory containing the tile images (not searched recursively).
    #[arg(long, env = "TESSERA_TILES_DIR")]
    pub tiles_dir: PathBuf,

    /// Tile used once every tile has been consumed by a mosaic.
    ///
    /// Must be a file name inside the tiles directory. Defaults to the first
    /// tile in name order.
    #[arg(long, env = "TESSERA_FALLBACK_TILE")]
    pub fallback_tile: Option<String>,

    /// Abort startup if any tile cannot be decoded instead of skipping it.
    #[arg(long, default_value_t = false, env = "TESSERA_STRICT_INDEX")]
    pub strict_index: bool,
}

impl LibraryConfig {
    /// How undecodable tiles are handled while indexing.
    pub fn decode_policy(&self) -> DecodePolicy {
        if self.strict_index {
            DecodePolicy::Fail
        } else {
            DecodePolicy::Skip
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.tiles_dir.as_os_str().is_empty() {
            return Err(
                "Tiles directory is required. Set --tiles-dir or TESSERA_TILES_DIR".to_string(),
            );
        }
        if let Some(ref fallback) = self.fallback_tile {
            if fallback.is_empty() || fallback.contains(['/', '\\']) {
                return Err(format!(
                    "fallback_tile must be a file name inside the tiles directory, got {:?}",
                    fallback
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    #[command(flatten)]
    pub library: LibraryConfig,

    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "TESSERA_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "TESSERA_PORT")]
    pub port: u16,

    /// Maximum upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "TESSERA_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "TESSERA_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Mosaic Configuration
    // =========================================================================
    /// Tile size in pixels when a request does not specify one.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "TESSERA_TILE_SIZE")]
    pub default_tile_size: u32,

    /// JPEG quality for mosaic responses (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "TESSERA_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.library.validate()?;

        if self.default_tile_size == 0 {
            return Err("default_tile_size must be greater than 0".to_string());
        }

        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if self.max_upload_bytes < 1024 {
            return Err("max_upload_bytes must be at least 1KB".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Render Command
// =============================================================================

/// Configuration for the `render` command.
#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    #[command(flatten)]
    pub library: LibraryConfig,

    /// Source image to turn into a mosaic.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file; the format follows the extension.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Tile size in pixels.
    #[arg(short, long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: u32,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RenderConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.library.validate()?;

        if self.tile_size == 0 {
            return Err("tile_size must be greater than 0".to_string());
        }

        if image::ImageFormat::from_path(&self.output).is_err() {
            return Err(format!(
                "Cannot infer an image format from output path {}",
                self.output.display()
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
