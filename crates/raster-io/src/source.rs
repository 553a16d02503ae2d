//! Resolution of the raster a request should display.

use std::fs::File;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use overlay_common::RasterResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::suffix_for_upload;
use crate::transient::{TransientFile, TransientFileStore};

/// An uploaded file as received from the UI layer.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-side filename, used only as a suffix hint
    pub filename: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// One user action asking for a raster to be shown.
#[derive(Debug, Clone, Default)]
pub struct RasterRequest {
    /// Region selector; carried into logs only
    pub region: String,
    pub upload: Option<Upload>,
    pub default_path: Option<PathBuf>,
}

impl RasterRequest {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    pub fn with_upload(mut self, upload: Upload) -> Self {
        self.upload = Some(upload);
        self
    }

    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = Some(path.into());
        self
    }
}

/// Where a resolved raster came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterOrigin {
    Uploaded,
    Default,
    None,
}

impl std::fmt::Display for RasterOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RasterOrigin::Uploaded => "uploaded",
            RasterOrigin::Default => "default",
            RasterOrigin::None => "none",
        };
        f.write_str(s)
    }
}

/// The single authoritative raster for a request.
///
/// `Uploaded` owns its temporary file; dropping or releasing the value
/// deletes it. `Default` paths are never deleted.
#[derive(Debug)]
pub enum ResolvedRaster {
    Uploaded(TransientFile),
    Default(PathBuf),
    None,
}

impl ResolvedRaster {
    pub fn origin(&self) -> RasterOrigin {
        match self {
            ResolvedRaster::Uploaded(_) => RasterOrigin::Uploaded,
            ResolvedRaster::Default(_) => RasterOrigin::Default,
            ResolvedRaster::None => RasterOrigin::None,
        }
    }

    /// Path to read, absent for `None`.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolvedRaster::Uploaded(file) => Some(file.path()),
            ResolvedRaster::Default(path) => Some(path),
            ResolvedRaster::None => None,
        }
    }

    /// Release any owned temporary file. A no-op for `Default` and `None`.
    pub fn release(self) -> RasterResult<()> {
        match self {
            ResolvedRaster::Uploaded(file) => file.release(),
            ResolvedRaster::Default(_) | ResolvedRaster::None => Ok(()),
        }
    }
}

/// Chooses between an upload and the configured default raster.
#[derive(Debug, Clone)]
pub struct RasterSource {
    store: TransientFileStore,
}

impl RasterSource {
    pub fn new(store: TransientFileStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TransientFileStore {
        &self.store
    }

    /// Resolve the raster for `request`.
    ///
    /// An upload always wins over a default path. Absence of both (or a
    /// default path that cannot be opened) yields `ResolvedRaster::None`;
    /// only a failed materialization is an error.
    pub fn resolve(&self, request: &RasterRequest) -> RasterResult<ResolvedRaster> {
        if let Some(upload) = &request.upload {
            let suffix = suffix_for_upload(&upload.filename);
            let file = self.store.materialize(&upload.data, &suffix)?;
            return Ok(ResolvedRaster::Uploaded(file));
        }

        if let Some(path) = &request.default_path {
            if is_readable_file(path) {
                let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                return Ok(ResolvedRaster::Default(path));
            }
            debug!(path = %path.display(), "Default raster not readable");
        }

        Ok(ResolvedRaster::None)
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_in(dir: &Path) -> RasterSource {
        RasterSource::new(TransientFileStore::in_dir(dir))
    }

    #[test]
    fn test_upload_preferred_over_default() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("default.tif");
        std::fs::write(&default, b"default").unwrap();

        let request = RasterRequest::new("Region A")
            .with_upload(Upload::new("mine.tif", b"uploaded".to_vec()))
            .with_default_path(&default);

        let resolved = source_in(dir.path()).resolve(&request).unwrap();
        assert_eq!(resolved.origin(), RasterOrigin::Uploaded);
        let path = resolved.path().unwrap().to_path_buf();
        assert_ne!(path, default);
        assert_eq!(std::fs::read(&path).unwrap(), b"uploaded");

        resolved.release().unwrap();
        assert!(!path.exists());
        assert!(default.exists());
    }

    #[test]
    fn test_default_used_without_upload() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("default.tif");
        std::fs::write(&default, b"default").unwrap();

        let request = RasterRequest::new("Region B").with_default_path(&default);
        let resolved = source_in(dir.path()).resolve(&request).unwrap();

        assert_eq!(resolved.origin(), RasterOrigin::Default);
        assert!(resolved.path().unwrap().is_absolute());

        resolved.release().unwrap();
        assert!(default.exists(), "default raster must never be deleted");
    }

    #[test]
    fn test_none_when_nothing_available() {
        let dir = tempfile::tempdir().unwrap();
        let request = RasterRequest::new("Region C")
            .with_default_path(dir.path().join("missing.tif"));

        let resolved = source_in(dir.path()).resolve(&request).unwrap();
        assert_eq!(resolved.origin(), RasterOrigin::None);
        assert!(resolved.path().is_none());

        let bare = RasterRequest::new("Region C");
        assert_eq!(
            source_in(dir.path()).resolve(&bare).unwrap().origin(),
            RasterOrigin::None
        );
    }

    #[test]
    fn test_directory_is_not_a_default_raster() {
        let dir = tempfile::tempdir().unwrap();
        let request = RasterRequest::new("Region A").with_default_path(dir.path());

        let resolved = source_in(dir.path()).resolve(&request).unwrap();
        assert_eq!(resolved.origin(), RasterOrigin::None);
    }
}
