//! Collaborators the pipeline talks to: the map and the user notification channel.

use ndarray::Array3;
use overlay_common::{GeoBounds, RasterResult, ViewRequest};
use raster_display::{ColorRamp, NormalizedImage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a layer registered with a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerHandle(Uuid);

impl LayerHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for LayerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A layer handed to the map. The map owns it after `add_layer` returns.
///
/// Registrations carry data, not paths into the transient store: an
/// uploaded file is gone once the pipeline returns.
#[derive(Debug, Clone)]
pub enum LayerRegistration {
    /// Tiles served by a tile service under `url_template` (`{z}/{x}/{y}`).
    Tile {
        url_template: String,
        name: String,
        bounds: GeoBounds,
    },
    /// Bands already in 0..=255, (height, width, bands).
    MultiBand {
        band_indices: Vec<usize>,
        samples: Array3<u8>,
        name: String,
        bounds: GeoBounds,
    },
    /// A normalized image stretched over its bounds.
    ImageOverlay {
        image: NormalizedImage,
        name: String,
        opacity: f32,
        color_ramp: ColorRamp,
    },
}

impl LayerRegistration {
    pub fn name(&self) -> &str {
        match self {
            LayerRegistration::Tile { name, .. }
            | LayerRegistration::MultiBand { name, .. }
            | LayerRegistration::ImageOverlay { name, .. } => name,
        }
    }

    pub fn bounds(&self) -> GeoBounds {
        match self {
            LayerRegistration::Tile { bounds, .. } | LayerRegistration::MultiBand { bounds, .. } => {
                *bounds
            }
            LayerRegistration::ImageOverlay { image, .. } => image.bounds,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LayerRegistration::Tile { .. } => "tile",
            LayerRegistration::MultiBand { .. } => "multi_band",
            LayerRegistration::ImageOverlay { .. } => "image_overlay",
        }
    }
}

/// The map the pipeline registers layers with.
pub trait MapSink {
    /// Register a layer and return its handle.
    fn add_layer(&mut self, layer: LayerRegistration) -> RasterResult<LayerHandle>;

    /// Center or fit the view. Called at most once per pipeline run.
    fn set_view(&mut self, view: ViewRequest) -> RasterResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Channel for user-visible messages.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}
