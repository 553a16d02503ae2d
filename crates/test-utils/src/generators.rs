//! Test data generators for synthetic raster bands.
//!
//! All generators return row-major `Vec`s (row 0 first), the layout the
//! GeoTIFF writer and `ndarray::Array2::from_shape_vec((height, width), ..)`
//! both expect.

/// Creates a test band with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly
/// by checking that band[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates an NDVI-like band in [-1, 1].
///
/// Bare soil (negative) in the top-left corner, dense vegetation (close
/// to 1) in the bottom-right.
pub fn create_ndvi_band(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let span = (width + height).saturating_sub(2).max(1) as f32;
    for row in 0..height {
        for col in 0..width {
            let t = (row + col) as f32 / span;
            data.push(-0.2 + t * 1.1);
        }
    }
    data
}

/// Creates a linear ramp from `min` (first cell) to `max` (last cell).
pub fn create_ramp_band(width: usize, height: usize, min: f32, max: f32) -> Vec<f32> {
    let n = width * height;
    if n <= 1 {
        return vec![min; n];
    }
    (0..n)
        .map(|i| min + (max - min) * i as f32 / (n - 1) as f32)
        .collect()
}

/// Creates a band where every cell holds `value`.
pub fn create_constant_band(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates an 8-bit band with a horizontal gradient offset by `offset`.
pub fn create_u8_band(width: usize, height: usize, offset: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let v = (col * 255 / width.max(2).saturating_sub(1).max(1)) as u8;
            data.push(v.wrapping_add(offset));
        }
    }
    data
}

/// Replaces every `step`-th cell with `value` (a nodata sentinel or NaN).
pub fn punch_holes(data: &mut [f32], step: usize, value: f32) {
    if step == 0 {
        return;
    }
    for cell in data.iter_mut().step_by(step) {
        *cell = value;
    }
}
