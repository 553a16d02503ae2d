//! A [`MapSink`] that renders layers to files instead of a live map.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use overlay_common::{GeoBounds, RasterError, RasterResult, ViewRequest};
use overlay_pipeline::{
    LayerHandle, LayerRegistration, MapSink, Notice, PipelineError, PipelineOutcome,
};
use raster_display::{colorize, create_png_auto, create_png_from_samples, BandStatistics};
use raster_io::RasterOrigin;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Name of the document written next to the layer images.
pub const DOCUMENT_FILE: &str = "map.json";

/// Where a layer's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSource {
    /// Served by a tile server.
    Tiles { url_template: String },
    /// A PNG next to the document, stretched over the layer bounds.
    Image { file: String, width: usize, height: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub handle: LayerHandle,
    pub name: String,
    /// Registration kind, e.g. `image_overlay`
    pub kind: String,
    pub bounds: GeoBounds,
    pub source: LayerSource,
}

/// Everything the map received during one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub generated_at: DateTime<Utc>,
    pub region: String,
    pub origin: Option<RasterOrigin>,
    /// Strategy that placed the layer
    pub strategy: Option<String>,
    pub layers: Vec<LayerEntry>,
    pub view: Option<ViewRequest>,
    pub statistics: Option<BandStatistics>,
    /// Failed strategies, formatted for display
    pub failures: Vec<String>,
    pub notices: Vec<Notice>,
}

/// Sink that writes each layer's image into `out_dir`.
pub struct DocumentSink {
    out_dir: PathBuf,
    layers: Vec<LayerEntry>,
    view: Option<ViewRequest>,
}

impl DocumentSink {
    /// Create the sink, creating `out_dir` if needed.
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;
        Ok(Self {
            out_dir,
            layers: Vec::new(),
            view: None,
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn layers(&self) -> &[LayerEntry] {
        &self.layers
    }

    pub fn view(&self) -> Option<&ViewRequest> {
        self.view.as_ref()
    }

    /// Assemble the document for a finished pipeline run.
    pub fn into_document(
        self,
        region: &str,
        result: &Result<PipelineOutcome, PipelineError>,
        notices: Vec<Notice>,
    ) -> MapDocument {
        let (origin, strategy, statistics, failures) = match result {
            Ok(PipelineOutcome::Displayed(layer)) => (
                Some(layer.origin),
                Some(layer.strategy.clone()),
                layer.placement.statistics,
                layer.failures.iter().map(|f| f.to_string()).collect(),
            ),
            Ok(PipelineOutcome::NoRaster) => (None, None, None, Vec::new()),
            Err(e) => (
                None,
                None,
                None,
                e.failures().iter().map(|f| f.to_string()).collect(),
            ),
        };

        MapDocument {
            generated_at: Utc::now(),
            region: region.to_string(),
            origin,
            strategy,
            layers: self.layers,
            view: self.view,
            statistics,
            failures,
            notices,
        }
    }

    fn write_image(&self, handle: LayerHandle, png: &[u8]) -> RasterResult<String> {
        let file = format!("layer-{}.png", handle.id());
        let path = self.out_dir.join(&file);
        fs::write(&path, png).map_err(|e| RasterError::io(&path, e))?;
        debug!(path = %path.display(), bytes = png.len(), "Wrote layer image");
        Ok(file)
    }
}

impl MapSink for DocumentSink {
    fn add_layer(&mut self, layer: LayerRegistration) -> RasterResult<LayerHandle> {
        let handle = LayerHandle::new();

        let source = match &layer {
            LayerRegistration::Tile { url_template, .. } => LayerSource::Tiles {
                url_template: url_template.clone(),
            },
            LayerRegistration::MultiBand { samples, .. } => {
                let (height, width, _) = samples.dim();
                let png = create_png_from_samples(samples).map_err(RasterError::sink)?;
                LayerSource::Image {
                    file: self.write_image(handle, &png)?,
                    width,
                    height,
                }
            }
            LayerRegistration::ImageOverlay {
                image,
                opacity,
                color_ramp,
                ..
            } => {
                let rgba = colorize(image, *color_ramp, *opacity);
                let png = create_png_auto(&rgba, image.width(), image.height())
                    .map_err(RasterError::sink)?;
                LayerSource::Image {
                    file: self.write_image(handle, &png)?,
                    width: image.width(),
                    height: image.height(),
                }
            }
        };

        info!(handle = %handle, kind = layer.kind(), name = layer.name(), "Layer added");
        self.layers.push(LayerEntry {
            handle,
            name: layer.name().to_string(),
            kind: layer.kind().to_string(),
            bounds: layer.bounds(),
            source,
        });
        Ok(handle)
    }

    fn set_view(&mut self, view: ViewRequest) -> RasterResult<()> {
        if self.layers.is_empty() {
            return Err(RasterError::sink("view requested before any layer was added"));
        }
        self.view = Some(view);
        Ok(())
    }
}

/// Write `document` as pretty JSON into `out_dir`.
pub fn write_document(document: &MapDocument, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(DOCUMENT_FILE);
    let json = serde_json::to_string_pretty(document).context("Failed to serialize map document")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}
