//! GeoTIFF decoding against fixtures written with test-utils.

use overlay_common::GeoBounds;
use raster_io::{RasterDecoder, SampleType};
use test_utils::{
    assert_approx_eq, bounds, create_constant_band, create_ndvi_band, create_test_grid,
    create_u8_band, nodata, punch_holes, temp_test_dir, write_geotiff_f32, write_geotiff_u8,
    write_single_band, Georef,
};

fn assert_bounds_approx(actual: GeoBounds, expected: GeoBounds) {
    assert_approx_eq!(actual.south, expected.south, 1e-9);
    assert_approx_eq!(actual.west, expected.west, 1e-9);
    assert_approx_eq!(actual.north, expected.north, 1e-9);
    assert_approx_eq!(actual.east, expected.east, 1e-9);
}

#[test]
fn test_bounds_from_tiepoint_and_scale() {
    let dir = temp_test_dir();
    let path = write_single_band(
        &dir.path().join("a.tif"),
        8,
        6,
        create_ndvi_band(8, 6),
        bounds::REGION_A,
    );

    let found = RasterDecoder::new().open_bounds(&path).unwrap();
    assert_bounds_approx(found, bounds::REGION_A);
}

#[test]
fn test_bounds_from_transformation_matrix() {
    let dir = temp_test_dir();
    let path = write_geotiff_f32(
        &dir.path().join("matrix.tif"),
        5,
        4,
        &[create_ndvi_band(5, 4)],
        Georef::Transformation(bounds::REGION_B),
        None,
    );

    let found = RasterDecoder::new().open_bounds(&path).unwrap();
    assert_bounds_approx(found, bounds::REGION_B);
}

#[test]
fn test_missing_georeferencing_is_bounds_unavailable() {
    let dir = temp_test_dir();
    let path = write_geotiff_f32(
        &dir.path().join("plain.tif"),
        4,
        4,
        &[create_constant_band(4, 4, 1.0)],
        Georef::None,
        None,
    );

    let decoder = RasterDecoder::new();
    let err = decoder.open_bounds(&path).unwrap_err();
    assert_eq!(err.kind(), "BoundsUnavailable");

    // Pixels are still readable without georeferencing
    assert_eq!(decoder.read_band(&path, 1).unwrap().dim(), (4, 4));
    assert_eq!(decoder.decode(&path, &[1]).unwrap_err().kind(), "BoundsUnavailable");
}

#[test]
fn test_garbage_is_decode_failure() {
    let dir = temp_test_dir();
    let path = dir.path().join("not-a-tiff.tif");
    std::fs::write(&path, b"definitely not a tiff").unwrap();

    let err = RasterDecoder::new().open_bounds(&path).unwrap_err();
    assert_eq!(err.kind(), "DecodeFailure");
}

#[test]
fn test_read_band_values_row_major() {
    let dir = temp_test_dir();
    let path = write_single_band(
        &dir.path().join("grid.tif"),
        10,
        5,
        create_test_grid(10, 5),
        bounds::UNIT,
    );

    let band = RasterDecoder::new().read_band(&path, 1).unwrap();
    assert_eq!(band.dim(), (5, 10));
    assert_eq!(band[[0, 0]], 0.0);
    assert_eq!(band[[0, 1]], 1000.0);
    assert_eq!(band[[1, 0]], 1.0);
    assert_eq!(band[[4, 9]], 9004.0);
}

#[test]
fn test_read_bands_in_requested_order() {
    let dir = temp_test_dir();
    let path = write_geotiff_f32(
        &dir.path().join("rgb.tif"),
        3,
        2,
        &[
            create_constant_band(3, 2, 1.0),
            create_constant_band(3, 2, 2.0),
            create_constant_band(3, 2, 3.0),
        ],
        Georef::Tiepoint(bounds::UNIT),
        None,
    );

    let bands = RasterDecoder::new().read_bands(&path, &[3, 1]).unwrap();
    assert_eq!(bands.len(), 2);
    assert!(bands[0].iter().all(|&v| v == 3.0));
    assert!(bands[1].iter().all(|&v| v == 1.0));
}

#[test]
fn test_band_index_out_of_range() {
    let dir = temp_test_dir();
    let path = write_single_band(
        &dir.path().join("one.tif"),
        2,
        2,
        create_constant_band(2, 2, 0.5),
        bounds::UNIT,
    );

    let decoder = RasterDecoder::new();
    assert_eq!(decoder.read_bands(&path, &[1, 2, 3]).unwrap_err().kind(), "DecodeFailure");
    assert_eq!(decoder.read_band(&path, 0).unwrap_err().kind(), "DecodeFailure");
}

#[test]
fn test_inspect_reports_layout_and_nodata() {
    let dir = temp_test_dir();
    let mut band = create_ndvi_band(6, 4);
    punch_holes(&mut band, 5, nodata::GDAL_DEFAULT as f32);
    let path = write_geotiff_f32(
        &dir.path().join("holes.tif"),
        6,
        4,
        &[band],
        Georef::Tiepoint(bounds::REGION_A),
        Some(nodata::GDAL_DEFAULT),
    );

    let info = RasterDecoder::new().inspect(&path).unwrap();
    assert_eq!((info.width, info.height), (6, 4));
    assert_eq!(info.band_count, 1);
    assert_eq!(info.sample_type, Some(SampleType::F32));
    assert!(!info.tiled);
    assert_eq!(info.nodata, Some(nodata::GDAL_DEFAULT));
    assert!(info.bounds.is_some());
}

#[test]
fn test_decode_masks_nodata() {
    let dir = temp_test_dir();
    let mut band = create_constant_band(4, 1, 0.25);
    band[2] = nodata::GDAL_DEFAULT as f32;
    let path = write_geotiff_f32(
        &dir.path().join("masked.tif"),
        4,
        1,
        &[band],
        Georef::Tiepoint(bounds::UNIT),
        Some(nodata::GDAL_DEFAULT),
    );

    let raster = RasterDecoder::new().decode(&path, &[1]).unwrap();
    assert_eq!(raster.nodata, Some(nodata::GDAL_DEFAULT));
    let masked = raster.masked_bands();
    assert!(masked[0][[0, 2]].is_nan());
    assert_eq!(masked[0][[0, 0]], 0.25);
}

#[test]
fn test_decode_masks_fractional_nodata() {
    let dir = temp_test_dir();
    let path = write_geotiff_f32(
        &dir.path().join("fractional.tif"),
        2,
        2,
        &[vec![0.1, 0.5, 0.9, 0.3]],
        Georef::Tiepoint(bounds::UNIT),
        Some(0.1),
    );

    let raster = RasterDecoder::new().decode(&path, &[1]).unwrap();
    let masked = raster.masked_bands();
    assert!(masked[0][[0, 0]].is_nan(), "0.1 is not exact in f32 but must still match");
    assert_eq!(masked[0].iter().filter(|v| v.is_nan()).count(), 1);
    assert_eq!(masked[0][[1, 1]], 0.3);
}

#[test]
fn test_decode_u8_rgb() {
    let dir = temp_test_dir();
    let path = write_geotiff_u8(
        &dir.path().join("rgb8.tif"),
        4,
        2,
        &[
            create_u8_band(4, 2, 0),
            create_u8_band(4, 2, 10),
            create_u8_band(4, 2, 20),
        ],
        Georef::Tiepoint(bounds::REGION_B),
        None,
    );

    let raster = RasterDecoder::new().decode(&path, &[1, 2, 3]).unwrap();
    assert_eq!(raster.sample_type, SampleType::U8);
    assert!(raster.sample_type.is_display_ready());
    assert_eq!(raster.band_count, 3);
    assert_eq!(raster.band_indices, vec![1, 2, 3]);
    assert_eq!(raster.bands[1][[0, 0]], 10.0);
    assert_bounds_approx(raster.bounds, bounds::REGION_B);
}
