//! tessera - A photo-mosaic server.
//!
//! This binary builds the tile index, then either starts the HTTP server or
//! renders a single mosaic to disk.

use std::process::ExitCode;

use clap::Parser;
use image::{DynamicImage, ImageFormat};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessera::{
    codec::decode_image,
    config::{Cli, Command, LibraryConfig, RenderConfig, ServeConfig},
    server::{create_router, RouterConfig},
    service::MosaicService,
    source::DirTileSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Render(config) => run_render(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Tiles directory: {}", config.library.tiles_dir.display());
    info!("  Default tile size: {}px", config.default_tile_size);
    info!("  JPEG quality: {}", config.jpeg_quality);
    info!("  Upload limit: {} bytes", config.max_upload_bytes);
    if config.library.strict_index {
        info!("  Index mode: strict (undecodable tiles abort startup)");
    }

    let Some(service) = load_service(&config.library).await else {
        return ExitCode::FAILURE;
    };

    let router = create_router(service, build_router_config(&config));
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Upload an image in your browser:");
    info!("    open http://{}/", addr);
    info!("");
    info!("  Or build a mosaic directly:");
    info!(
        "    curl -F image=@photo.jpg -F tile_size={} http://{}/api/mosaic -o mosaic.jpg",
        config.default_tile_size, addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_jpeg_quality(config.jpeg_quality)
        .with_default_tile_size(config.default_tile_size)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Render Command
// =============================================================================

async fn run_render(config: RenderConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(service) = load_service(&config.library).await else {
        return ExitCode::FAILURE;
    };

    let result = tokio::task::spawn_blocking(move || -> Result<(), String> {
        let data = std::fs::read(&config.input)
            .map_err(|e| format!("Cannot read {}: {}", config.input.display(), e))?;
        let image = decode_image(&data).map_err(|e| e.to_string())?;

        let output = service
            .render(image, config.tile_size)
            .map_err(|e| e.to_string())?;

        // JPEG has no alpha channel.
        let saved = match ImageFormat::from_path(&config.output) {
            Ok(ImageFormat::Jpeg) => {
                DynamicImage::ImageRgb8(output.mosaic.to_rgb8()).save(&config.output)
            }
            _ => output.mosaic.save(&config.output),
        };
        saved.map_err(|e| format!("Cannot write {}: {}", config.output.display(), e))?;

        info!(
            output = %config.output.display(),
            blocks = output.stats.blocks,
            matched = output.stats.matched,
            fallbacks = output.stats.exhausted + output.stats.recovered,
            elapsed_ms = output.duration.as_millis() as u64,
            "Mosaic written"
        );
        if output.stats.exhausted > 0 {
            warn!(
                "Tile library exhausted: {} blocks used the fallback tile",
                output.stats.exhausted
            );
        }
        Ok(())
    })
    .await;

    match result {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!("Render failed: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Render task failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Shared
// =============================================================================

/// Index the tile directory. Logs and returns `None` on failure.
async fn load_service(library: &LibraryConfig) -> Option<MosaicService<DirTileSource>> {
    let source = DirTileSource::new(&library.tiles_dir);
    let policy = library.decode_policy();
    let fallback = library.fallback_tile.clone();

    let result =
        tokio::task::spawn_blocking(move || MosaicService::from_source(source, policy, fallback))
            .await;

    match result {
        Ok(Ok(service)) => {
            info!(
                "  Indexed {} tile(s) from {}",
                service.tile_count(),
                service.tiles().root().display()
            );
            Some(service)
        }
        Ok(Err(e)) => {
            error!("Failed to build tile index: {}", e);
            error!("");
            error!("  Please check:");
            error!(
                "    - The directory '{}' exists and is readable",
                library.tiles_dir.display()
            );
            error!("    - It contains at least one decodable image");
            if library.fallback_tile.is_some() {
                error!("    - The fallback tile is one of those images");
            }
            None
        }
        Err(e) => {
            error!("Index task failed: {}", e);
            None
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tessera=debug,tower_http=debug"
    } else {
        "tessera=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
