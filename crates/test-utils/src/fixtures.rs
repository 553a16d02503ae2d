//! Common test fixtures for raster overlay tests.
//!
//! Bounds are given as (south, west, north, east) to match `GeoBounds::new`.

/// Common bounding boxes for testing.
pub mod bounds {
    use overlay_common::GeoBounds;

    /// One-degree square at the origin
    pub const UNIT: GeoBounds = GeoBounds {
        south: 0.0,
        west: 0.0,
        north: 1.0,
        east: 1.0,
    };

    /// Small field-scale scene in the Sahel
    pub const REGION_A: GeoBounds = GeoBounds {
        south: 13.0,
        west: 2.0,
        north: 13.5,
        east: 2.5,
    };

    /// Scene straddling the equator and prime meridian
    pub const REGION_B: GeoBounds = GeoBounds {
        south: -2.0,
        west: -3.0,
        north: 2.0,
        east: 3.0,
    };
}

/// Region selector labels offered by the UI.
pub mod regions {
    pub const REGION_A: &str = "Region A";
    pub const REGION_B: &str = "Region B";
    pub const REGION_C: &str = "Region C";
}

/// Common nodata sentinels.
pub mod nodata {
    pub const GDAL_DEFAULT: f64 = -9999.0;
    pub const ZERO: f64 = 0.0;
}
