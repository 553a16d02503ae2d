//! Scratch directories for tests that write rasters.

/// Scratch directory removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("overlay_test_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}
