//! Common types shared by the raster overlay crates.

pub mod bounds;
pub mod error;
pub mod view;

pub use bounds::{BoundsParseError, GeoBounds};
pub use error::{RasterError, RasterResult};
pub use view::{zoom_for_extent, ViewMode, ViewRequest, MAX_ZOOM};
