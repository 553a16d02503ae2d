//! Summary statistics for the displayed band.

use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

/// Min, max and mean over the finite samples of a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandStatistics {
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    /// Samples that took part (finite, not nodata)
    pub valid_count: usize,
    pub total_count: usize,
}

impl BandStatistics {
    /// Share of samples that were valid, 0.0 to 1.0.
    pub fn coverage(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.valid_count as f64 / self.total_count as f64
        }
    }
}

/// Statistics over finite samples, or `None` when there are none.
pub fn band_statistics<S, D>(data: &ArrayBase<S, D>) -> Option<BandStatistics>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum = 0.0f64;
    let mut valid_count = 0usize;

    for &v in data.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
        sum += v as f64;
        valid_count += 1;
    }

    if valid_count == 0 {
        return None;
    }

    Some(BandStatistics {
        min,
        max,
        mean: sum / valid_count as f64,
        valid_count,
        total_count: data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    #[test]
    fn test_band_statistics() {
        let band = arr2(&[[0.2_f32, 0.4], [f32::NAN, 0.9]]);
        let stats = band_statistics(&band).unwrap();
        assert_eq!(stats.min, 0.2);
        assert_eq!(stats.max, 0.9);
        assert!((stats.mean - 0.5).abs() < 1e-6);
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.total_count, 4);
        assert!((stats.coverage() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_no_finite_samples() {
        let band = Array2::<f32>::from_elem((2, 2), f32::NAN);
        assert!(band_statistics(&band).is_none());
    }
}
