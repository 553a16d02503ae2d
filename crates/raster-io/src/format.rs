//! Raster format detection from upload filenames.

use std::path::Path;

/// Suffix used when an upload's name gives no usable hint.
pub const DEFAULT_SUFFIX: &str = ".tif";

/// Detected raster format based on extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    /// GeoTIFF (`.tif`, `.tiff`, `.gtiff`)
    GeoTiff,
    /// Anything else; the decoder decides whether it can read it
    Unknown,
}

impl RasterFormat {
    /// Detect format from a filename or path.
    pub fn detect(name: &str) -> Self {
        let lower = name.to_lowercase();

        if lower.ends_with(".tif") || lower.ends_with(".tiff") || lower.ends_with(".gtiff") {
            RasterFormat::GeoTiff
        } else {
            RasterFormat::Unknown
        }
    }
}

/// Pick the temp-file suffix for an upload.
///
/// Keeps the upload's own GeoTIFF extension so downstream tools that sniff
/// by suffix behave the same as with the original file. Unknown names get
/// [`DEFAULT_SUFFIX`]; magic bytes are left to the decoder.
pub fn suffix_for_upload(filename: &str) -> String {
    match RasterFormat::detect(filename) {
        RasterFormat::GeoTiff => Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
        RasterFormat::Unknown => {
            tracing::warn!(filename = %filename, "Upload has no GeoTIFF suffix, using .tif");
            DEFAULT_SUFFIX.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(RasterFormat::detect("ndvi.tif"), RasterFormat::GeoTiff);
        assert_eq!(RasterFormat::detect("NDVI_2021.TIFF"), RasterFormat::GeoTiff);
        assert_eq!(RasterFormat::detect("scene.gtiff"), RasterFormat::GeoTiff);
        assert_eq!(RasterFormat::detect("scene.png"), RasterFormat::Unknown);
        assert_eq!(RasterFormat::detect("tif"), RasterFormat::Unknown);
    }

    #[test]
    fn test_suffix_for_upload() {
        assert_eq!(suffix_for_upload("region_a.tif"), ".tif");
        assert_eq!(suffix_for_upload("REGION_A.TIFF"), ".tiff");
        assert_eq!(suffix_for_upload("upload.bin"), ".tif");
        assert_eq!(suffix_for_upload(""), ".tif");
    }
}
