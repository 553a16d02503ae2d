//! One request, end to end: resolve, run the chain, release.

use std::sync::Arc;

use overlay_common::ViewRequest;
use raster_io::{RasterOrigin, RasterRequest, RasterSource, TransientFileStore};
use tracing::{error, info, instrument, warn};

use crate::chain::{ChainOutcome, OverlayStrategyChain};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, StrategyFailure};
use crate::sink::{MapSink, Notice, Notifier};
use crate::strategy::{
    DirectFormatStrategy, LayerPlacement, OverlayStrategy, RawOverlayStrategy, TileServerStrategy,
};
use crate::tile::{TileService, UrlTemplateTileService};

/// Shown when neither an upload nor a default raster is available.
pub const NO_RASTER_MESSAGE: &str = "No raster available: upload a GeoTIFF or configure a default raster";

/// A layer that made it onto the map.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedLayer {
    pub origin: RasterOrigin,
    pub strategy: String,
    pub placement: LayerPlacement,
    pub view: ViewRequest,
    /// Strategies that failed before `strategy` succeeded
    pub failures: Vec<StrategyFailure>,
}

/// Non-error results of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Nothing to show; the user was told so.
    NoRaster,
    Displayed(DisplayedLayer),
}

/// Resolves the raster for a request and runs the overlay strategy chain on it.
pub struct RasterPipeline {
    source: RasterSource,
    chain: OverlayStrategyChain,
}

impl RasterPipeline {
    pub fn new(source: RasterSource, chain: OverlayStrategyChain) -> Self {
        Self { source, chain }
    }

    /// Build the standard tile → direct → raw chain from configuration.
    ///
    /// A tile service is created only when `tile_server_url` is set.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let tile_service = config.tile_server_url.as_ref().map(|url| {
            Arc::new(UrlTemplateTileService::new(url.clone(), config.tile_publish_dir()))
                as Arc<dyn TileService>
        });
        Self::with_tile_service(config, tile_service)
    }

    /// Build the standard chain with an explicit tile service.
    pub fn with_tile_service(config: &PipelineConfig, tile_service: Option<Arc<dyn TileService>>) -> Self {
        let store = match &config.temp_dir {
            Some(dir) => TransientFileStore::in_dir(dir),
            None => TransientFileStore::new(),
        };
        let chain = OverlayStrategyChain::new(standard_strategies(config, tile_service), config.view);
        Self::new(RasterSource::new(store), chain)
    }

    pub fn store(&self) -> &TransientFileStore {
        self.source.store()
    }

    pub fn chain(&self) -> &OverlayStrategyChain {
        &self.chain
    }

    /// Display the raster for `request` on `sink`.
    ///
    /// A materialized upload is released before this returns, on every
    /// path. A failed release is logged and does not change the outcome.
    #[instrument(skip_all, fields(region = %request.region))]
    pub fn run(
        &self,
        request: &RasterRequest,
        sink: &mut dyn MapSink,
        notifier: &mut dyn Notifier,
    ) -> Result<PipelineOutcome, PipelineError> {
        let resolved = self.source.resolve(request)?;
        let origin = resolved.origin();

        let Some(path) = resolved.path().map(|p| p.to_path_buf()) else {
            info!("No raster to display");
            notifier.notify(Notice::warning(NO_RASTER_MESSAGE));
            return Ok(PipelineOutcome::NoRaster);
        };

        info!(origin = %origin, path = %path.display(), "Resolved raster");
        let outcome = self.chain.run(&path, sink);

        if let Err(e) = resolved.release() {
            error!(path = %path.display(), error = %e, "Failed to release upload");
        }

        match outcome {
            ChainOutcome::Succeeded {
                strategy,
                placement,
                view,
                failures,
            } => {
                if !failures.is_empty() {
                    warn!(strategy = %strategy, failed = failures.len(), "Displayed after fallback");
                }
                Ok(PipelineOutcome::Displayed(DisplayedLayer {
                    origin,
                    strategy,
                    placement,
                    view,
                    failures,
                }))
            }
            ChainOutcome::Exhausted(failures) => {
                error!(attempted = failures.len(), "All overlay strategies failed");
                for failure in &failures {
                    notifier.notify(Notice::error(failure.to_string()));
                }
                Err(PipelineError::Exhausted(failures))
            }
        }
    }
}

/// Tile server, then direct format, then raw overlay.
pub fn standard_strategies(
    config: &PipelineConfig,
    tile_service: Option<Arc<dyn TileService>>,
) -> Vec<Box<dyn OverlayStrategy>> {
    vec![
        Box::new(TileServerStrategy::new(
            tile_service,
            config.layer_name.clone(),
            config.tile_require_tiled,
        )),
        Box::new(DirectFormatStrategy::new(
            config.layer_name.clone(),
            config.rgb_bands.clone(),
        )),
        Box::new(RawOverlayStrategy::new(
            config.layer_name.clone(),
            config.rgb_bands.clone(),
            config.overlay_opacity,
            config.color_ramp,
        )),
    ]
}
