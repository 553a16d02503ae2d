//! GeoTIFF decoding: band reads and georeferenced bounds.
//!
//! Every call opens the file, reads what it needs and drops the handle;
//! nothing is cached between calls.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use overlay_common::{GeoBounds, RasterError, RasterResult};
use serde::{Deserialize, Serialize};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::TiffError;
use tracing::debug;

/// GeoTIFF tag IDs.
pub mod geotiff_tags {
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    pub const MODEL_TIEPOINT: u16 = 33922;
    pub const MODEL_TRANSFORMATION: u16 = 34264;
    pub const GDAL_NODATA: u16 = 42113;
}

/// Numeric type of the stored samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl SampleType {
    /// From the TIFF SampleFormat (1 = uint, 2 = int, 3 = float) and BitsPerSample tags.
    fn from_tags(format: u32, bits: u32) -> Option<Self> {
        match (format, bits) {
            (1, 8) => Some(Self::U8),
            (1, 16) => Some(Self::U16),
            (1, 32) => Some(Self::U32),
            (1, 64) => Some(Self::U64),
            (2, 8) => Some(Self::I8),
            (2, 16) => Some(Self::I16),
            (2, 32) => Some(Self::I32),
            (2, 64) => Some(Self::I64),
            (3, 32) => Some(Self::F32),
            (3, 64) => Some(Self::F64),
            _ => None,
        }
    }

    /// Samples already in 0-255 and directly displayable.
    pub fn is_display_ready(&self) -> bool {
        matches!(self, SampleType::U8)
    }
}

/// Metadata of a raster, read without decoding pixel data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterInfo {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    /// `None` for sample layouts the decoder does not recognize
    pub sample_type: Option<SampleType>,
    /// Internally tiled (TileWidth present) rather than stripped
    pub tiled: bool,
    /// `None` when the file carries no georeferencing
    pub bounds: Option<GeoBounds>,
    pub nodata: Option<f64>,
}

impl RasterInfo {
    /// (height, width) of each band.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Bands decoded for one strategy attempt.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    pub path: PathBuf,
    /// Total bands in the file
    pub band_count: usize,
    /// 1-based indices of `bands`, in order
    pub band_indices: Vec<usize>,
    pub bands: Vec<Array2<f32>>,
    pub bounds: GeoBounds,
    pub sample_type: SampleType,
    pub nodata: Option<f64>,
}

impl DecodedRaster {
    /// Bands with nodata samples replaced by NaN.
    ///
    /// Samples are compared in f32, the precision they were decoded to,
    /// so fractional nodata values like 0.1 still match.
    pub fn masked_bands(&self) -> Vec<Array2<f32>> {
        match self.nodata.map(|n| n as f32) {
            Some(nodata) => self
                .bands
                .iter()
                .map(|band| band.mapv(|v| if v == nodata { f32::NAN } else { v }))
                .collect(),
            None => self.bands.clone(),
        }
    }
}

/// Reads GeoTIFF rasters from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl RasterDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Read dimensions, band layout, tiling, bounds and nodata.
    pub fn inspect(&self, path: &Path) -> RasterResult<RasterInfo> {
        let mut decoder = open(path)?;
        read_info(&mut decoder, path)
    }

    /// Geographic bounds of the raster.
    ///
    /// Fails with `DecodeFailure` for unparseable files and with
    /// `BoundsUnavailable` for rasters without georeferencing.
    pub fn open_bounds(&self, path: &Path) -> RasterResult<GeoBounds> {
        let info = self.inspect(path)?;
        info.bounds.ok_or_else(|| {
            RasterError::bounds_unavailable(format!(
                "{} has no ModelTiepoint/ModelPixelScale or ModelTransformation tags",
                path.display()
            ))
        })
    }

    /// Read one band by 1-based index.
    pub fn read_band(&self, path: &Path, index: usize) -> RasterResult<Array2<f32>> {
        let mut bands = self.read_bands(path, &[index])?;
        bands
            .pop()
            .ok_or_else(|| RasterError::decode("no band decoded"))
    }

    /// Read several bands by 1-based index, in the given order.
    pub fn read_bands(&self, path: &Path, indices: &[usize]) -> RasterResult<Vec<Array2<f32>>> {
        let mut decoder = open(path)?;
        let info = read_info(&mut decoder, path)?;
        let (_, bands) = read_pixels(&mut decoder, path, &info, indices)?;
        Ok(bands)
    }

    /// Read bands together with bounds and sample metadata.
    pub fn decode(&self, path: &Path, indices: &[usize]) -> RasterResult<DecodedRaster> {
        let mut decoder = open(path)?;
        let info = read_info(&mut decoder, path)?;
        let bounds = info.bounds.ok_or_else(|| {
            RasterError::bounds_unavailable(format!("{} is not georeferenced", path.display()))
        })?;
        let (sample_type, bands) = read_pixels(&mut decoder, path, &info, indices)?;

        debug!(
            path = %path.display(),
            bands = ?indices,
            width = info.width,
            height = info.height,
            "Decoded raster"
        );

        Ok(DecodedRaster {
            path: path.to_path_buf(),
            band_count: info.band_count,
            band_indices: indices.to_vec(),
            bands,
            bounds,
            sample_type,
            nodata: info.nodata,
        })
    }
}

fn open(path: &Path) -> RasterResult<Decoder<BufReader<File>>> {
    let file = File::open(path)
        .map_err(|e| RasterError::decode(format!("cannot open {}: {}", path.display(), e)))?;
    Decoder::new(BufReader::new(file)).map_err(|e| tiff_error(path, e))
}

fn tiff_error(path: &Path, err: TiffError) -> RasterError {
    RasterError::decode(format!("{}: {}", path.display(), err))
}

fn read_info(decoder: &mut Decoder<BufReader<File>>, path: &Path) -> RasterResult<RasterInfo> {
    let (width, height) = decoder.dimensions().map_err(|e| tiff_error(path, e))?;

    let band_count = find_u32_vec(decoder, path, Tag::SamplesPerPixel)?
        .and_then(|v| v.first().copied())
        .unwrap_or(1) as usize;
    let bits = find_u32_vec(decoder, path, Tag::BitsPerSample)?
        .and_then(|v| v.first().copied())
        .unwrap_or(1);
    let format = find_u32_vec(decoder, path, Tag::SampleFormat)?
        .and_then(|v| v.first().copied())
        .unwrap_or(1);
    let tiled = decoder
        .find_tag(Tag::TileWidth)
        .map_err(|e| tiff_error(path, e))?
        .is_some();

    let bounds = read_bounds(decoder, path, width as usize, height as usize)?;
    let nodata = read_nodata(decoder, path)?;

    Ok(RasterInfo {
        width: width as usize,
        height: height as usize,
        band_count,
        sample_type: SampleType::from_tags(format, bits),
        tiled,
        bounds,
        nodata,
    })
}

fn find_u32_vec(
    decoder: &mut Decoder<BufReader<File>>,
    path: &Path,
    tag: Tag,
) -> RasterResult<Option<Vec<u32>>> {
    decoder
        .find_tag(tag)
        .map_err(|e| tiff_error(path, e))?
        .map(|v| v.into_u32_vec())
        .transpose()
        .map_err(|e| tiff_error(path, e))
}

fn find_f64_vec(
    decoder: &mut Decoder<BufReader<File>>,
    path: &Path,
    tag_id: u16,
) -> RasterResult<Option<Vec<f64>>> {
    decoder
        .find_tag(Tag::from_u16_exhaustive(tag_id))
        .map_err(|e| tiff_error(path, e))?
        .map(|v| v.into_f64_vec())
        .transpose()
        .map_err(|e| tiff_error(path, e))
}

/// Pixel (col, row) to model (x, y).
#[derive(Debug, Clone, Copy)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }
}

fn read_bounds(
    decoder: &mut Decoder<BufReader<File>>,
    path: &Path,
    width: usize,
    height: usize,
) -> RasterResult<Option<GeoBounds>> {
    use geotiff_tags::*;

    let scale = find_f64_vec(decoder, path, MODEL_PIXEL_SCALE)?;
    let tiepoint = find_f64_vec(decoder, path, MODEL_TIEPOINT)?;
    let transformation = find_f64_vec(decoder, path, MODEL_TRANSFORMATION)?;

    let affine = match (scale, tiepoint, transformation) {
        (Some(s), Some(t), _) if s.len() >= 2 && t.len() >= 6 => Affine {
            a: s[0],
            b: 0.0,
            c: t[3] - t[0] * s[0],
            d: 0.0,
            e: -s[1],
            f: t[4] + t[1] * s[1],
        },
        (_, _, Some(m)) if m.len() >= 16 => Affine {
            a: m[0],
            b: m[1],
            c: m[3],
            d: m[4],
            e: m[5],
            f: m[7],
        },
        _ => return Ok(None),
    };

    let (w, h) = (width as f64, height as f64);
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(c, r)| affine.apply(c, r));
    let bounds = GeoBounds::enclosing(corners).filter(|b| b.is_valid());
    if bounds.is_none() {
        debug!(path = %path.display(), "Georeferencing present but degenerate");
    }
    Ok(bounds)
}

fn read_nodata(decoder: &mut Decoder<BufReader<File>>, path: &Path) -> RasterResult<Option<f64>> {
    let value = decoder
        .find_tag(Tag::from_u16_exhaustive(geotiff_tags::GDAL_NODATA))
        .map_err(|e| tiff_error(path, e))?;

    Ok(value
        .and_then(|v| v.into_string().ok())
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f64>().ok()))
}

fn read_pixels(
    decoder: &mut Decoder<BufReader<File>>,
    path: &Path,
    info: &RasterInfo,
    indices: &[usize],
) -> RasterResult<(SampleType, Vec<Array2<f32>>)> {
    if let Some(&bad) = indices
        .iter()
        .find(|&&i| i == 0 || i > info.band_count)
    {
        return Err(RasterError::decode(format!(
            "band index {} out of range 1..={} for {}",
            bad,
            info.band_count,
            path.display()
        )));
    }

    let image = decoder.read_image().map_err(|e| tiff_error(path, e))?;
    let (sample_type, samples) = to_f32(image);

    let pixels = info.width * info.height;
    if pixels == 0 || samples.len() != pixels * info.band_count {
        return Err(RasterError::decode(format!(
            "{}: expected {} samples ({}x{}x{}), decoded {}",
            path.display(),
            pixels * info.band_count,
            info.width,
            info.height,
            info.band_count,
            samples.len()
        )));
    }

    let stride = info.band_count;
    let bands = indices
        .iter()
        .map(|&index| {
            let band: Vec<f32> = samples
                .iter()
                .skip(index - 1)
                .step_by(stride)
                .copied()
                .collect();
            Array2::from_shape_vec(info.shape(), band)
                .map_err(|e| RasterError::decode(format!("band {}: {}", index, e)))
        })
        .collect::<RasterResult<Vec<_>>>()?;

    Ok((sample_type, bands))
}

fn to_f32(image: DecodingResult) -> (SampleType, Vec<f32>) {
    match image {
        DecodingResult::U8(v) => (SampleType::U8, v.into_iter().map(|x| x as f32).collect()),
        DecodingResult::U16(v) => (SampleType::U16, v.into_iter().map(|x| x as f32).collect()),
        DecodingResult::U32(v) => (SampleType::U32, v.into_iter().map(|x| x as f32).collect()),
        DecodingResult::U64(v) => (SampleType::U64, v.into_iter().map(|x| x as f32).collect()),
        DecodingResult::I8(v) => (SampleType::I8, v.into_iter().map(|x| x as f32).collect()),
        DecodingResult::I16(v) => (SampleType::I16, v.into_iter().map(|x| x as f32).collect()),
        DecodingResult::I32(v) => (SampleType::I32, v.into_iter().map(|x| x as f32).collect()),
        DecodingResult::I64(v) => (SampleType::I64, v.into_iter().map(|x| x as f32).collect()),
        DecodingResult::F32(v) => (SampleType::F32, v),
        DecodingResult::F64(v) => (SampleType::F64, v.into_iter().map(|x| x as f32).collect()),
    }
}
