//! Error taxonomy for raster acquisition, decoding and display.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors raised while acquiring, decoding, normalizing or registering a raster.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Filesystem write/delete failure around a transient file.
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file cannot be parsed as a raster, or a band read failed.
    #[error("failed to decode raster: {0}")]
    Decode(String),

    /// Bands disagree in height/width.
    #[error("band {band} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        band: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The raster parsed but carries no usable georeferencing.
    #[error("raster bounds unavailable: {0}")]
    BoundsUnavailable(String),

    /// A capability the strategy depends on is absent or refuses the raster.
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The map sink rejected a layer registration.
    #[error("map sink rejected layer: {0}")]
    Sink(String),
}

impl RasterError {
    /// Create an Io error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a BoundsUnavailable error.
    pub fn bounds_unavailable(msg: impl Into<String>) -> Self {
        Self::BoundsUnavailable(msg.into())
    }

    /// Create an Unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a Sink error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Short machine-readable code used in logs and failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            RasterError::Io { .. } => "IOFailure",
            RasterError::Decode(_) => "DecodeFailure",
            RasterError::ShapeMismatch { .. } => "ShapeMismatch",
            RasterError::BoundsUnavailable(_) => "BoundsUnavailable",
            RasterError::Unavailable(_) => "Unavailable",
            RasterError::Sink(_) => "SinkFailure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(RasterError::decode("bad header").kind(), "DecodeFailure");
        assert_eq!(
            RasterError::ShapeMismatch {
                band: 1,
                expected: (2, 2),
                found: (3, 3)
            }
            .kind(),
            "ShapeMismatch"
        );
        assert_eq!(
            RasterError::io("/tmp/x.tif", std::io::Error::other("disk full")).kind(),
            "IOFailure"
        );
    }

    #[test]
    fn test_display_includes_path() {
        let err = RasterError::io("/data/ndvi.tif", std::io::Error::other("boom"));
        let msg = err.to_string();
        assert!(msg.contains("/data/ndvi.tif"));
        assert!(msg.contains("boom"));
    }
}
