//! Error types for the overlay pipeline.

use overlay_common::RasterError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One failed strategy attempt, kept in attempt order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyFailure {
    /// Strategy name
    pub strategy: String,
    /// Error code from `RasterError::kind`
    pub kind: String,
    pub message: String,
}

impl StrategyFailure {
    pub fn new(strategy: impl Into<String>, error: &RasterError) -> Self {
        Self {
            strategy: strategy.into(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed ({}): {}", self.strategy, self.kind, self.message)
    }
}

/// Terminal failures of a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Every strategy failed; failures are in attempt order.
    #[error("all {} overlay strategies failed", .0.len())]
    Exhausted(Vec<StrategyFailure>),

    /// The upload could not be materialized.
    #[error("failed to resolve raster: {0}")]
    Resolve(#[from] RasterError),
}

impl PipelineError {
    /// Per-strategy failures, empty unless exhausted.
    pub fn failures(&self) -> &[StrategyFailure] {
        match self {
            PipelineError::Exhausted(failures) => failures,
            PipelineError::Resolve(_) => &[],
        }
    }
}

/// Invalid pipeline configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("overlay_opacity must be within 0.0..=1.0, got {0}")]
    InvalidOpacity(f32),

    #[error("rgb_bands must be non-empty 1-based indices, got {0:?}")]
    InvalidBands(Vec<usize>),

    #[error("layer_name must not be empty")]
    EmptyLayerName,

    #[error("tile_server_url must be an http(s) URL, got {0}")]
    InvalidTileUrl(String),

    #[error("zoom must be at most {max}, got {zoom}")]
    InvalidZoom { zoom: u8, max: u8 },
}
