//! Geographic bounds of a raster or overlay.

use serde::{Deserialize, Serialize};

/// A geographic rectangle in degrees, stored in map-overlay order
/// (south, west, north, east).
///
/// No reprojection is applied anywhere in the pipeline; coordinates are
/// taken as they appear in the raster's georeferencing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Create bounds from (south, west, north, east).
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Smallest bounds enclosing all of the given (x, y) = (lon, lat) points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let mut bounds = Self::new(y0, x0, y0, x0);
        for (x, y) in iter {
            bounds.west = bounds.west.min(x);
            bounds.east = bounds.east.max(x);
            bounds.south = bounds.south.min(y);
            bounds.north = bounds.north.max(y);
        }
        Some(bounds)
    }

    /// Parse "south,west,north,east".
    pub fn from_swne_string(s: &str) -> Result<Self, BoundsParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BoundsParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BoundsParseError::InvalidNumber(part.to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Midpoint as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// East-west extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// North-south extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// All four edges are finite and the rectangle is not inverted.
    ///
    /// Zero-area bounds (a single point) are valid.
    pub fn is_valid(&self) -> bool {
        [self.south, self.west, self.north, self.east]
            .iter()
            .all(|v| v.is_finite())
            && self.south <= self.north
            && self.west <= self.east
    }

    /// Check if a (lat, lon) point lies inside the bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }

    /// Corner pairs in the `[[south, west], [north, east]]` layout map widgets expect.
    pub fn to_corner_pairs(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

impl std::fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(S {:.6}, W {:.6}, N {:.6}, E {:.6})",
            self.south, self.west, self.north, self.east
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoundsParseError {
    #[error("Invalid bounds format: {0}. Expected 'south,west,north,east'")]
    InvalidFormat(String),

    #[error("Invalid number in bounds: {0}")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_midpoint() {
        let bounds = GeoBounds::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(bounds.center(), (0.5, 0.5));

        let bounds = GeoBounds::new(10.0, -5.0, 15.0, 2.0);
        assert_eq!(bounds.center(), (12.5, -1.5));
    }

    #[test]
    fn test_parse_swne() {
        let bounds = GeoBounds::from_swne_string("10, -5, 15, 2").unwrap();
        assert_eq!(bounds, GeoBounds::new(10.0, -5.0, 15.0, 2.0));

        assert!(matches!(
            GeoBounds::from_swne_string("1,2,3"),
            Err(BoundsParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            GeoBounds::from_swne_string("1,2,x,4"),
            Err(BoundsParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_enclosing_points() {
        let bounds =
            GeoBounds::enclosing([(-5.0, 15.0), (2.0, 10.0), (0.0, 12.0)]).unwrap();
        assert_eq!(bounds, GeoBounds::new(10.0, -5.0, 15.0, 2.0));
        assert!(GeoBounds::enclosing(Vec::new()).is_none());
    }

    #[test]
    fn test_validity() {
        assert!(GeoBounds::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(GeoBounds::new(1.0, 1.0, 1.0, 1.0).is_valid());
        assert!(!GeoBounds::new(2.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!GeoBounds::new(f64::NAN, 0.0, 1.0, 1.0).is_valid());
    }
}
