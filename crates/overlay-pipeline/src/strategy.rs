//! Overlay strategies, from most to least capable.
//!
//! Each strategy either registers exactly one layer with the map sink and
//! returns where it landed, or returns the error that made it give up.

use std::path::Path;
use std::sync::Arc;

use overlay_common::{GeoBounds, RasterError, RasterResult};
use raster_display::{band_statistics, normalize_bands, stack_bands, BandStatistics, ColorRamp};
use raster_io::RasterDecoder;
use tracing::{debug, warn};

use crate::sink::{LayerHandle, LayerRegistration, MapSink};
use crate::tile::TileService;

/// A registered layer and the bounds it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPlacement {
    pub handle: LayerHandle,
    pub bounds: GeoBounds,
    /// Min/max/mean of the first displayed band, when the strategy decoded pixels
    pub statistics: Option<BandStatistics>,
}

/// One way of turning a raster file into a map layer.
pub trait OverlayStrategy: Send + Sync {
    /// Stable name used in logs, metrics and failure reports.
    fn name(&self) -> &str;

    /// Register a layer for `path` with `sink`.
    fn attempt(&self, path: &Path, sink: &mut dyn MapSink) -> RasterResult<LayerPlacement>;
}

/// Band indices to display for a raster with `band_count` bands.
///
/// Multi-band rasters with enough bands use `rgb_bands`; anything else
/// shows band 1.
pub fn select_bands(band_count: usize, rgb_bands: &[usize]) -> Vec<usize> {
    if band_count >= 3 && !rgb_bands.is_empty() && rgb_bands.iter().all(|&b| b >= 1 && b <= band_count) {
        rgb_bands.to_vec()
    } else {
        vec![1]
    }
}

// ============================================================================
// Tile server
// ============================================================================

/// Hands the raster to a tile service and registers the resulting tile layer.
pub struct TileServerStrategy {
    service: Option<Arc<dyn TileService>>,
    decoder: RasterDecoder,
    layer_name: String,
    require_tiled: bool,
}

impl TileServerStrategy {
    pub const NAME: &'static str = "tile_server";

    pub fn new(
        service: Option<Arc<dyn TileService>>,
        layer_name: impl Into<String>,
        require_tiled: bool,
    ) -> Self {
        Self {
            service,
            decoder: RasterDecoder::new(),
            layer_name: layer_name.into(),
            require_tiled,
        }
    }
}

impl OverlayStrategy for TileServerStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn attempt(&self, path: &Path, sink: &mut dyn MapSink) -> RasterResult<LayerPlacement> {
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| RasterError::unavailable("no tile service configured"))?;

        let info = self.decoder.inspect(path)?;
        if self.require_tiled && !info.tiled {
            return Err(RasterError::unavailable(format!(
                "{} serves internally tiled GeoTIFFs only; raster is stripped",
                service.name()
            )));
        }
        let bounds = info.bounds.ok_or_else(|| {
            RasterError::bounds_unavailable(format!("{} is not georeferenced", path.display()))
        })?;

        let endpoint = service.publish(path, &info)?;
        debug!(layer_id = %endpoint.layer_id, url = %endpoint.url_template, "Tile layer published");

        let registration = LayerRegistration::Tile {
            url_template: endpoint.url_template.clone(),
            name: self.layer_name.clone(),
            bounds,
        };
        let handle = match sink.add_layer(registration) {
            Ok(handle) => handle,
            Err(e) => {
                if let Err(cleanup) = service.unpublish(&endpoint) {
                    warn!(layer_id = %endpoint.layer_id, error = %cleanup, "Failed to withdraw published raster");
                }
                return Err(e);
            }
        };

        Ok(LayerPlacement {
            handle,
            bounds,
            statistics: None,
        })
    }
}

// ============================================================================
// Direct format
// ============================================================================

/// Hands display-ready 8-bit bands to the map as a composed multi-band layer.
///
/// Rasters with a nodata value are left to the raw overlay, which masks them.
pub struct DirectFormatStrategy {
    decoder: RasterDecoder,
    layer_name: String,
    rgb_bands: Vec<usize>,
}

impl DirectFormatStrategy {
    pub const NAME: &'static str = "direct_format";

    pub fn new(layer_name: impl Into<String>, rgb_bands: Vec<usize>) -> Self {
        Self {
            decoder: RasterDecoder::new(),
            layer_name: layer_name.into(),
            rgb_bands,
        }
    }
}

impl OverlayStrategy for DirectFormatStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn attempt(&self, path: &Path, sink: &mut dyn MapSink) -> RasterResult<LayerPlacement> {
        let info = self.decoder.inspect(path)?;
        match info.sample_type {
            Some(sample_type) if sample_type.is_display_ready() => {}
            other => {
                return Err(RasterError::unavailable(format!(
                    "direct display needs 8-bit unsigned samples, found {}",
                    other.map_or_else(|| "unknown".to_string(), |t| format!("{:?}", t))
                )))
            }
        }

        if let Some(nodata) = info.nodata {
            return Err(RasterError::unavailable(format!(
                "direct display cannot mask nodata ({}); needs a validity mask",
                nodata
            )));
        }

        let indices = select_bands(info.band_count, &self.rgb_bands);
        let raster = self.decoder.decode(path, &indices)?;
        let statistics = raster.bands.first().and_then(band_statistics);
        let samples = stack_bands(&raster.bands)?.mapv(|v| v.clamp(0.0, 255.0) as u8);

        let handle = sink.add_layer(LayerRegistration::MultiBand {
            band_indices: raster.band_indices,
            samples,
            name: self.layer_name.clone(),
            bounds: raster.bounds,
        })?;

        Ok(LayerPlacement {
            handle,
            bounds: raster.bounds,
            statistics,
        })
    }
}

// ============================================================================
// Raw overlay
// ============================================================================

/// Decodes, normalizes and registers the raster as a fixed-bounds image overlay.
pub struct RawOverlayStrategy {
    decoder: RasterDecoder,
    layer_name: String,
    rgb_bands: Vec<usize>,
    opacity: f32,
    color_ramp: ColorRamp,
}

impl RawOverlayStrategy {
    pub const NAME: &'static str = "raw_overlay";

    pub fn new(
        layer_name: impl Into<String>,
        rgb_bands: Vec<usize>,
        opacity: f32,
        color_ramp: ColorRamp,
    ) -> Self {
        Self {
            decoder: RasterDecoder::new(),
            layer_name: layer_name.into(),
            rgb_bands,
            opacity,
            color_ramp,
        }
    }
}

impl OverlayStrategy for RawOverlayStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn attempt(&self, path: &Path, sink: &mut dyn MapSink) -> RasterResult<LayerPlacement> {
        let info = self.decoder.inspect(path)?;
        let indices = select_bands(info.band_count, &self.rgb_bands);
        let raster = self.decoder.decode(path, &indices)?;

        let bands = raster.masked_bands();
        let statistics = bands.first().and_then(band_statistics);
        let image = normalize_bands(&bands, raster.bounds)?;

        let handle = sink.add_layer(LayerRegistration::ImageOverlay {
            image,
            name: self.layer_name.clone(),
            opacity: self.opacity,
            color_ramp: self.color_ramp,
        })?;

        Ok(LayerPlacement {
            handle,
            bounds: raster.bounds,
            statistics,
        })
    }
}
