//! Map view requests issued after a layer is registered.

use serde::{Deserialize, Serialize};

use crate::GeoBounds;

/// Deepest zoom level a derived view will use.
pub const MAX_ZOOM: u8 = 18;

/// How the map view is framed around a newly registered layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ViewMode {
    /// Center on the bounds midpoint. `zoom: None` derives a zoom from the extent.
    Center { zoom: Option<u8> },
    /// Ask the map to fit the bounds itself.
    FitBounds,
}

impl Default for ViewMode {
    fn default() -> Self {
        Self::Center { zoom: None }
    }
}

impl ViewMode {
    /// Parse from string (case-insensitive). Unknown values fall back to centering.
    pub fn from_str(s: &str, zoom: Option<u8>) -> Self {
        match s.to_lowercase().as_str() {
            "fit" | "fit_bounds" => Self::FitBounds,
            _ => Self::Center { zoom },
        }
    }

    /// Build the view request for the given bounds.
    pub fn request_for(&self, bounds: &GeoBounds) -> ViewRequest {
        match self {
            ViewMode::FitBounds => ViewRequest::FitBounds(*bounds),
            ViewMode::Center { zoom } => ViewRequest::centered_on(bounds, *zoom),
        }
    }
}

/// A single "set view" call on the map sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewRequest {
    Center { lat: f64, lon: f64, zoom: u8 },
    FitBounds(GeoBounds),
}

impl ViewRequest {
    /// Center on the midpoint of `bounds`, deriving the zoom when not given.
    pub fn centered_on(bounds: &GeoBounds, zoom: Option<u8>) -> Self {
        let (lat, lon) = bounds.center();
        ViewRequest::Center {
            lat,
            lon,
            zoom: zoom.unwrap_or_else(|| zoom_for_extent(bounds)),
        }
    }

    /// Center point as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        match self {
            ViewRequest::Center { lat, lon, .. } => (*lat, *lon),
            ViewRequest::FitBounds(bounds) => bounds.center(),
        }
    }
}

/// Web-mercator style zoom at which the larger extent of `bounds` roughly fills a tile.
pub fn zoom_for_extent(bounds: &GeoBounds) -> u8 {
    let extent = bounds.width().abs().max(bounds.height().abs() * 2.0);
    if !extent.is_finite() || extent <= 0.0 {
        return MAX_ZOOM;
    }
    let zoom = (360.0 / extent).log2().floor();
    zoom.clamp(0.0, MAX_ZOOM as f64) as u8
}
