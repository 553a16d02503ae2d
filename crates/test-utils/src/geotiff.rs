//! Minimal GeoTIFF writer for fixtures.
//!
//! Writes stripped, chunky-interleaved images with 1, 3 or 4 bands and
//! optional ModelTiepoint/ModelPixelScale georeferencing plus a GDAL
//! nodata tag.

use std::fs::File;
use std::path::{Path, PathBuf};

use overlay_common::GeoBounds;
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;
use tiff::TiffResult;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GDAL_NODATA: u16 = 42113;

/// How a fixture is georeferenced.
#[derive(Debug, Clone, Copy)]
pub enum Georef {
    /// No georeferencing tags at all
    None,
    /// ModelTiepoint + ModelPixelScale covering the bounds
    Tiepoint(GeoBounds),
    /// 4x4 ModelTransformation matrix covering the bounds
    Transformation(GeoBounds),
}

/// Write float bands as a GeoTIFF at `path`.
///
/// Panics on any encoding failure; fixtures are expected to be writable.
pub fn write_geotiff_f32(
    path: &Path,
    width: u32,
    height: u32,
    bands: &[Vec<f32>],
    georef: Georef,
    nodata: Option<f64>,
) -> PathBuf {
    let data = interleave(width, height, bands);
    let result = match bands.len() {
        1 => write_image::<colortype::Gray32Float>(path, width, height, &data, georef, nodata),
        3 => write_image::<colortype::RGB32Float>(path, width, height, &data, georef, nodata),
        4 => write_image::<colortype::RGBA32Float>(path, width, height, &data, georef, nodata),
        n => panic!("unsupported band count for fixture: {}", n),
    };
    result.unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
    path.to_path_buf()
}

/// Write 8-bit bands as a GeoTIFF at `path`.
pub fn write_geotiff_u8(
    path: &Path,
    width: u32,
    height: u32,
    bands: &[Vec<u8>],
    georef: Georef,
    nodata: Option<f64>,
) -> PathBuf {
    let data = interleave(width, height, bands);
    let result = match bands.len() {
        1 => write_image::<colortype::Gray8>(path, width, height, &data, georef, nodata),
        3 => write_image::<colortype::RGB8>(path, width, height, &data, georef, nodata),
        4 => write_image::<colortype::RGBA8>(path, width, height, &data, georef, nodata),
        n => panic!("unsupported band count for fixture: {}", n),
    };
    result.unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
    path.to_path_buf()
}

/// Write a single-band float raster covering `bounds`.
pub fn write_single_band(path: &Path, width: u32, height: u32, band: Vec<f32>, bounds: GeoBounds) -> PathBuf {
    write_geotiff_f32(path, width, height, &[band], Georef::Tiepoint(bounds), None)
}

fn interleave<T: Copy>(width: u32, height: u32, bands: &[Vec<T>]) -> Vec<T> {
    let pixels = (width * height) as usize;
    for (i, band) in bands.iter().enumerate() {
        assert_eq!(band.len(), pixels, "band {} has wrong length", i + 1);
    }
    let mut data = Vec::with_capacity(pixels * bands.len());
    for p in 0..pixels {
        for band in bands {
            data.push(band[p]);
        }
    }
    data
}

fn write_image<C: ColorType>(
    path: &Path,
    width: u32,
    height: u32,
    data: &[C::Inner],
    georef: Georef,
    nodata: Option<f64>,
) -> TiffResult<()>
where
    [C::Inner]: TiffValue,
{
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    let mut image = encoder.new_image::<C>(width, height)?;

    match georef {
        Georef::None => {}
        Georef::Tiepoint(b) => {
            let scale = [b.width() / width as f64, b.height() / height as f64, 0.0];
            let tiepoint = [0.0, 0.0, 0.0, b.west, b.north, 0.0];
            image
                .encoder()
                .write_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE), &scale[..])?;
            image
                .encoder()
                .write_tag(Tag::from_u16_exhaustive(MODEL_TIEPOINT), &tiepoint[..])?;
        }
        Georef::Transformation(b) => {
            let sx = b.width() / width as f64;
            let sy = b.height() / height as f64;
            let matrix = [
                sx, 0.0, 0.0, b.west, //
                0.0, -sy, 0.0, b.north, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
            image
                .encoder()
                .write_tag(Tag::from_u16_exhaustive(MODEL_TRANSFORMATION), &matrix[..])?;
        }
    }

    if let Some(nodata) = nodata {
        let text = nodata.to_string();
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(GDAL_NODATA), text.as_str())?;
    }

    image.write_data(data)
}
