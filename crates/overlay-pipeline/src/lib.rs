//! Raster overlay pipeline.
//!
//! Turns "show this region" plus an optional upload into exactly one map
//! layer:
//!
//! ```text
//! RasterRequest ─► RasterSource ─► OverlayStrategyChain ─► MapSink
//!                   (upload? ─► TransientFileStore)   tile_server
//!                                                      direct_format
//!                                                      raw_overlay
//! ```
//!
//! The temporary file behind an upload lives exactly as long as the chain
//! run and is released on every exit path.

pub mod chain;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod strategy;
pub mod tile;

pub use chain::{ChainOutcome, OverlayStrategyChain, StrategyOutcome};
pub use config::PipelineConfig;
pub use error::{ConfigError, PipelineError, StrategyFailure};
pub use pipeline::{
    standard_strategies, DisplayedLayer, PipelineOutcome, RasterPipeline, NO_RASTER_MESSAGE,
};
pub use sink::{LayerHandle, LayerRegistration, MapSink, Notice, NoticeLevel, Notifier};
pub use strategy::{
    select_bands, DirectFormatStrategy, LayerPlacement, OverlayStrategy, RawOverlayStrategy,
    TileServerStrategy,
};
pub use tile::{TileEndpoint, TileService, UrlTemplateTileService};
