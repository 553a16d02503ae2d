//! Display preparation for decoded rasters.
//!
//! - [`normalize`]: stack-wide rescaling of bands to 8-bit samples
//! - [`colormap`]: color ramps and RGBA composition with opacity
//! - [`png`]: PNG encoding of the resulting images
//! - [`stats`]: min/max/mean of the displayed band

pub mod colormap;
pub mod normalize;
pub mod png;
pub mod stats;

pub use colormap::{colorize, Color, ColorRamp};
pub use normalize::{normalize_bands, stack_bands, to_uint8, value_range, NormalizedImage};
pub use png::{create_png, create_png_auto, create_png_from_samples, create_png_indexed, PngColor};
pub use stats::{band_statistics, BandStatistics};
