//! Configuration for the overlay pipeline.

use std::path::PathBuf;

use overlay_common::{ViewMode, MAX_ZOOM};
use raster_display::ColorRamp;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Configuration for the overlay pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raster shown when the user uploads nothing.
    pub default_raster_path: Option<PathBuf>,

    /// Directory for materialized uploads; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,

    /// Base URL of the tile server; the tile strategy is unavailable when unset.
    pub tile_server_url: Option<String>,

    /// Directory the tile server reads published rasters from.
    pub tile_publish_dir: Option<PathBuf>,

    /// Only hand internally tiled GeoTIFFs to the tile server.
    pub tile_require_tiled: bool,

    /// 1-based band indices composed as RGB for multi-band rasters.
    pub rgb_bands: Vec<usize>,

    /// Display name of the registered layer.
    pub layer_name: String,

    /// Opacity of image overlays (0.0 - 1.0).
    pub overlay_opacity: f32,

    /// Ramp for single-band image overlays.
    pub color_ramp: ColorRamp,

    /// How the view is framed after registration.
    pub view: ViewMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_raster_path: None,
            temp_dir: None,
            tile_server_url: None,
            tile_publish_dir: None,
            tile_require_tiled: true,
            rgb_bands: vec![1, 2, 3],
            layer_name: "NDVI".to_string(),
            overlay_opacity: 0.7,
            color_ramp: ColorRamp::RedGreen,
            view: ViewMode::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RASTER_DEFAULT_PATH") {
            if !val.is_empty() {
                config.default_raster_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("RASTER_TEMP_DIR") {
            if !val.is_empty() {
                config.temp_dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("TILE_SERVER_URL") {
            if !val.is_empty() {
                config.tile_server_url = Some(val);
            }
        }

        if let Ok(val) = std::env::var("TILE_PUBLISH_DIR") {
            if !val.is_empty() {
                config.tile_publish_dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("TILE_REQUIRE_TILED") {
            config.tile_require_tiled = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("RASTER_RGB_BANDS") {
            match parse_band_list(&val) {
                Some(bands) => config.rgb_bands = bands,
                None => warn!(value = %val, "Ignoring invalid RASTER_RGB_BANDS"),
            }
        }

        if let Ok(val) = std::env::var("RASTER_LAYER_NAME") {
            config.layer_name = val;
        }

        if let Ok(val) = std::env::var("OVERLAY_OPACITY") {
            if let Ok(opacity) = val.parse() {
                config.overlay_opacity = opacity;
            }
        }

        if let Ok(val) = std::env::var("OVERLAY_COLOR_RAMP") {
            config.color_ramp = ColorRamp::from_str(&val);
        }

        let zoom = std::env::var("MAP_ZOOM").ok().and_then(|v| v.parse().ok());
        if let Ok(val) = std::env::var("MAP_VIEW_MODE") {
            config.view = ViewMode::from_str(&val, zoom);
        } else if zoom.is_some() {
            config.view = ViewMode::Center { zoom };
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(ConfigError::InvalidOpacity(self.overlay_opacity));
        }

        if self.rgb_bands.is_empty() || self.rgb_bands.contains(&0) {
            return Err(ConfigError::InvalidBands(self.rgb_bands.clone()));
        }

        if self.layer_name.trim().is_empty() {
            return Err(ConfigError::EmptyLayerName);
        }

        if let Some(url) = &self.tile_server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidTileUrl(url.clone()));
            }
        }

        if let ViewMode::Center { zoom: Some(zoom) } = self.view {
            if zoom > MAX_ZOOM {
                return Err(ConfigError::InvalidZoom {
                    zoom,
                    max: MAX_ZOOM,
                });
            }
        }

        Ok(())
    }

    /// Directory the tile server reads from, defaulting under the system temp dir.
    pub fn tile_publish_dir(&self) -> PathBuf {
        self.tile_publish_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("raster-tiles"))
    }
}

/// Parse "1,2,3" into band indices. `None` when any entry is not a positive integer.
pub fn parse_band_list(s: &str) -> Option<Vec<usize>> {
    let bands: Option<Vec<usize>> = s
        .split(',')
        .map(|part| part.trim().parse::<usize>().ok().filter(|&b| b >= 1))
        .collect();
    bands.filter(|b| !b.is_empty())
}
