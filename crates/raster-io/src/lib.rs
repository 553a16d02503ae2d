//! Raster acquisition for the overlay pipeline.
//!
//! Turns a [`RasterRequest`] into a readable path and decodes GeoTIFF
//! content from it:
//!
//! - [`TransientFileStore`] materializes uploads as temporary files and
//!   guarantees their release
//! - [`RasterSource`] picks the authoritative raster (upload over default)
//! - [`RasterDecoder`] reads bands and georeferenced bounds
//!
//! ```text
//! RasterRequest
//!      │
//!      ▼
//! RasterSource::resolve ──► upload? ──► TransientFileStore::materialize ──► Uploaded(guard)
//!      │                        └──► default readable? ──► Default(path)
//!      │                                   └──► None
//!      ▼
//! RasterDecoder::{open_bounds, read_band, read_bands}
//! ```

pub mod decoder;
pub mod format;
pub mod source;
pub mod transient;

pub use decoder::{DecodedRaster, RasterDecoder, RasterInfo, SampleType};
pub use format::{suffix_for_upload, RasterFormat};
pub use source::{RasterOrigin, RasterRequest, RasterSource, ResolvedRaster, Upload};
pub use transient::{release, TransientFile, TransientFileStore, TransientStats};
