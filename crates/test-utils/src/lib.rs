//! Test support for the raster overlay crates.
//!
//! - synthetic bands ([`generators`]) and GeoTIFF files built from them ([`geotiff`])
//! - bounds, region names and nodata values ([`fixtures`])
//! - scratch directories ([`paths`])
//!
//! ```ignore
//! use test_utils::{bounds, create_ndvi_band, temp_test_dir, write_single_band};
//!
//! let dir = temp_test_dir();
//! let path = write_single_band(&dir.path().join("ndvi.tif"), 8, 8, create_ndvi_band(8, 8), bounds::UNIT);
//! ```

pub mod fixtures;
pub mod generators;
pub mod geotiff;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use geotiff::*;
pub use paths::*;

/// Assert two numbers are within `epsilon` of each other.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
