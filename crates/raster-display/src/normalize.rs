//! Conversion of arbitrary-range bands to 8-bit display samples.
//!
//! Statistics are computed over the whole input, so when a band stack is
//! normalized the relative contrast between bands is preserved. Non-finite
//! samples (NaN, nodata already masked to NaN, infinities) are left out of
//! the statistics and map to 0.

use ndarray::{Array, Array2, Array3, ArrayBase, Axis, Data, Dimension};
use overlay_common::{GeoBounds, RasterError, RasterResult};

/// Finite minimum and maximum, or `None` when no sample is finite.
pub fn value_range<S, D>(data: &ArrayBase<S, D>) -> Option<(f32, f32)>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    data.iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Rescale to 0..=255 with `round(255 * (x - min) / (max - min))`.
///
/// Works on a single band or a stack. A constant input (max == min) or an
/// input with no finite samples yields all zeros.
pub fn to_uint8<S, D>(data: &ArrayBase<S, D>) -> Array<u8, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    match value_range(data) {
        Some((min, max)) if max > min => {
            let min = min as f64;
            let scale = 255.0 / (max as f64 - min);
            data.mapv(|v| {
                if v.is_finite() {
                    ((v as f64 - min) * scale).round().clamp(0.0, 255.0) as u8
                } else {
                    0
                }
            })
        }
        _ => Array::zeros(data.raw_dim()),
    }
}

/// Stack bands along a new last axis: (height, width) -> (height, width, bands).
pub fn stack_bands(bands: &[Array2<f32>]) -> RasterResult<Array3<f32>> {
    let first = bands
        .first()
        .ok_or_else(|| RasterError::decode("no bands to stack"))?;
    let expected = first.dim();

    if let Some((i, band)) = bands
        .iter()
        .enumerate()
        .find(|(_, band)| band.dim() != expected)
    {
        return Err(RasterError::ShapeMismatch {
            band: i + 1,
            expected,
            found: band.dim(),
        });
    }

    let views: Vec<_> = bands.iter().map(|b| b.view()).collect();
    ndarray::stack(Axis(2), &views).map_err(|e| RasterError::decode(e.to_string()))
}

/// 8-bit samples ready for display, with the bounds they cover.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    /// (height, width, channels)
    pub pixels: Array3<u8>,
    pub bounds: GeoBounds,
    /// Per-pixel validity; `None` when every pixel had finite samples
    pub valid: Option<Array2<bool>>,
}

impl NormalizedImage {
    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn channels(&self) -> usize {
        self.pixels.dim().2
    }

    /// Whether the pixel at (row, col) had finite samples in every band.
    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.valid
            .as_ref()
            .map_or(true, |mask| mask[[row, col]])
    }
}

/// Stack and normalize bands into a display image.
pub fn normalize_bands(bands: &[Array2<f32>], bounds: GeoBounds) -> RasterResult<NormalizedImage> {
    let stack = stack_bands(bands)?;

    let valid = if stack.iter().all(|v| v.is_finite()) {
        None
    } else {
        Some(stack.map_axis(Axis(2), |px| px.iter().all(|v| v.is_finite())))
    };

    let pixels = to_uint8(&stack);
    let (h, w, c) = pixels.dim();
    tracing::debug!(width = w, height = h, channels = c, "Normalized bands");

    Ok(NormalizedImage {
        pixels,
        bounds,
        valid,
    })
}
