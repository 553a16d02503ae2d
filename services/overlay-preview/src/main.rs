//! Overlay preview CLI.
//!
//! Resolves a GeoTIFF (upload or default), runs the overlay strategy chain
//! and writes the resulting map document and layer images to a directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use overlay_pipeline::{PipelineOutcome, RasterPipeline};
use raster_io::{RasterRequest, Upload};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use overlay_preview::{resolve_config, write_document, DocumentSink, LogNotifier};

#[derive(Parser, Debug)]
#[command(name = "overlay-preview")]
#[command(about = "Place a GeoTIFF on a map document using tile, direct or raw overlay display")]
struct Args {
    /// GeoTIFF handled as a user upload
    #[arg(short, long)]
    upload: Option<PathBuf>,

    /// Raster shown when nothing is uploaded (overrides config)
    #[arg(long)]
    default_raster: Option<PathBuf>,

    /// Region being viewed
    #[arg(short, long, default_value = "Region A")]
    region: String,

    /// YAML pipeline configuration; the environment is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for map.json and layer images
    #[arg(short, long, default_value = "map-preview")]
    out: PathBuf,

    /// Tile server base URL (overrides config)
    #[arg(long)]
    tile_server_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    if args.json_logs {
        fmt().with_env_filter(filter).with_target(true).json().init();
    } else {
        fmt().with_env_filter(filter).with_target(true).init();
    }

    info!("Starting overlay preview");

    let mut config = resolve_config(args.config.as_deref())?;
    if let Some(path) = &args.default_raster {
        config.default_raster_path = Some(path.clone());
    }
    if let Some(url) = &args.tile_server_url {
        config.tile_server_url = Some(url.clone());
    }
    config.validate()?;
    info!(
        layer = %config.layer_name,
        rgb_bands = ?config.rgb_bands,
        tile_server = config.tile_server_url.is_some(),
        "Loaded configuration"
    );

    let mut request = RasterRequest::new(args.region.clone());
    if let Some(path) = &config.default_raster_path {
        request = request.with_default_path(path);
    }
    if let Some(path) = &args.upload {
        let data = fs::read(path).with_context(|| format!("Failed to read upload {:?}", path))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        request = request.with_upload(Upload::new(filename, Bytes::from(data)));
    }

    let pipeline = RasterPipeline::from_config(&config);
    let mut sink = DocumentSink::new(&args.out)?;
    let mut notifier = LogNotifier::new();

    let result = pipeline.run(&request, &mut sink, &mut notifier);

    let document = sink.into_document(&args.region, &result, notifier.into_notices());
    let path = write_document(&document, &args.out)?;
    info!(path = %path.display(), layers = document.layers.len(), "Wrote map document");

    match result {
        Ok(PipelineOutcome::Displayed(layer)) => {
            info!(strategy = %layer.strategy, origin = %layer.origin, "Raster displayed");
            Ok(())
        }
        Ok(PipelineOutcome::NoRaster) => Ok(()),
        Err(e) => {
            error!(error = %e, "Raster could not be displayed");
            std::process::exit(1);
        }
    }
}
