//! Temporary files for uploaded rasters.
//!
//! [`TransientFileStore::materialize`] writes an upload to a uniquely named
//! file and hands back a [`TransientFile`] guard. The guard is the only owner
//! of that path: it is deleted exactly once, either by an explicit
//! [`TransientFile::release`] or when the guard is dropped (early return,
//! error propagation, unwinding).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use overlay_common::{RasterError, RasterResult};
use tracing::{debug, error, warn};

const FILE_PREFIX: &str = "raster-upload-";

/// Counters for materialized and released files.
#[derive(Debug, Default)]
struct Counters {
    materialized: AtomicU64,
    released: AtomicU64,
}

/// Snapshot of transient file activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransientStats {
    pub materialized: u64,
    pub released: u64,
}

impl TransientStats {
    /// Files materialized but not yet released.
    pub fn outstanding(&self) -> u64 {
        self.materialized.saturating_sub(self.released)
    }
}

/// Materializes byte streams as path-addressable temporary files.
#[derive(Debug, Clone, Default)]
pub struct TransientFileStore {
    /// Directory for temporary files; the system temp dir when `None`.
    dir: Option<PathBuf>,
    counters: Arc<Counters>,
}

impl TransientFileStore {
    /// Store that writes into the system temp directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that writes into `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            counters: Arc::default(),
        }
    }

    /// Directory new files are created in.
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Write `bytes` to a new uniquely named file ending in `suffix`.
    ///
    /// The returned path is always absolute.
    ///
    /// A file that was created but could not be fully written is removed
    /// before the error is returned.
    pub fn materialize(&self, bytes: &[u8], suffix: &str) -> RasterResult<TransientFile> {
        // Relative temp dirs (e.g. from RASTER_TEMP_DIR) resolve against the cwd now.
        let dir = std::path::absolute(self.dir()).map_err(|e| RasterError::io(self.dir(), e))?;
        let mut file = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .suffix(suffix)
            .tempfile_in(&dir)
            .map_err(|e| RasterError::io(&dir, e))?;

        // Until `keep` succeeds the NamedTempFile still deletes itself on drop.
        let write_result = file.write_all(bytes).and_then(|_| file.flush());
        if let Err(e) = write_result {
            let path = file.path().to_path_buf();
            return Err(RasterError::io(path, e));
        }

        let (_, path) = file.keep().map_err(|e| {
            let path = e.file.path().to_path_buf();
            RasterError::io(path, e.error)
        })?;

        self.counters.materialized.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("overlay_transient_files_total", "event" => "materialized").increment(1);
        debug!(path = %path.display(), size = bytes.len(), "Materialized upload");

        Ok(TransientFile {
            path,
            counters: Arc::clone(&self.counters),
            released: false,
        })
    }

    /// Current counters.
    pub fn stats(&self) -> TransientStats {
        TransientStats {
            materialized: self.counters.materialized.load(Ordering::SeqCst),
            released: self.counters.released.load(Ordering::SeqCst),
        }
    }
}

/// Delete `path` if it still exists.
///
/// Idempotent: a path that is already gone is not an error.
pub fn release(path: &Path) -> RasterResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RasterError::io(path, e)),
    }
}

/// Owning guard for a materialized upload.
#[derive(Debug)]
pub struct TransientFile {
    path: PathBuf,
    counters: Arc<Counters>,
    released: bool,
}

impl TransientFile {
    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now and report the outcome.
    pub fn release(mut self) -> RasterResult<()> {
        self.release_once()
    }

    fn release_once(&mut self) -> RasterResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.counters.released.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("overlay_transient_files_total", "event" => "released").increment(1);

        let result = release(&self.path);
        match &result {
            Ok(()) => debug!(path = %self.path.display(), "Released upload"),
            Err(e) => error!(path = %self.path.display(), error = %e, "Failed to release upload"),
        }
        result
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if !self.released {
            warn!(path = %self.path.display(), "Upload released by drop");
            let _ = self.release_once();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_writes_bytes_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientFileStore::in_dir(dir.path());

        let file = store.materialize(b"II*\0payload", ".tif").unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(FILE_PREFIX));
        assert!(name.ends_with(".tif"));
        assert_eq!(std::fs::read(file.path()).unwrap(), b"II*\0payload");

        file.release().unwrap();
    }

    #[test]
    fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientFileStore::in_dir(dir.path());

        let a = store.materialize(b"a", ".tif").unwrap();
        let b = store.materialize(b"b", ".tif").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_release_deletes_and_counts_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientFileStore::in_dir(dir.path());

        let file = store.materialize(b"data", ".tif").unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(store.stats().outstanding(), 1);

        file.release().unwrap();
        assert!(!path.exists());
        assert_eq!(
            store.stats(),
            TransientStats {
                materialized: 1,
                released: 1
            }
        );
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientFileStore::in_dir(dir.path());

        let path = {
            let file = store.materialize(b"data", ".tif").unwrap();
            file.path().to_path_buf()
        };

        assert!(!path.exists());
        assert_eq!(store.stats().released, 1);
    }

    #[test]
    fn test_relative_dir_yields_absolute_path() {
        let store = TransientFileStore::in_dir(".");

        let file = store.materialize(b"data", ".tif").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.is_absolute());
        assert!(path.exists());

        file.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.tif");

        assert!(release(&path).is_ok());
        std::fs::write(&path, b"x").unwrap();
        assert!(release(&path).is_ok());
        assert!(release(&path).is_ok());
        assert!(!path.exists());
    }

    #[test]
    fn test_release_after_external_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientFileStore::in_dir(dir.path());

        let file = store.materialize(b"data", ".tif").unwrap();
        std::fs::remove_file(file.path()).unwrap();

        assert!(file.release().is_ok());
        assert_eq!(store.stats().outstanding(), 0);
    }

    #[test]
    fn test_materialize_into_missing_dir_fails_with_io() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientFileStore::in_dir(dir.path().join("does-not-exist"));

        let err = store.materialize(b"data", ".tif").unwrap_err();
        assert_eq!(err.kind(), "IOFailure");
        assert_eq!(store.stats().materialized, 0);
    }
}
