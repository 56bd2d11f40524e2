//! Normalized coordinate types.

use serde::{Deserialize, Serialize};

/// Which half of a coordinate pair a raw value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Number of integer-degree digits in the fixed-width source encoding
    pub fn degree_digits(&self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    /// Inclusive valid range in decimal degrees
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Axis::Latitude => (-90.0, 90.0),
            Axis::Longitude => (-180.0, 180.0),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let (min, max) = self.bounds();
        value.is_finite() && value >= min && value <= max
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Latitude => write!(f, "latitude"),
            Axis::Longitude => write!(f, "longitude"),
        }
    }
}

/// A validated (lat, lon) pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Build a coordinate, returning `None` when either half is outside its range
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if Axis::Latitude.contains(lat) && Axis::Longitude.contains(lon) {
            Some(Self { lat, lon })
        } else {
            None
        }
    }

    /// Pair up two optional halves; absent or out-of-range halves yield `None`
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Self::new(lat, lon),
            _ => None,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lat={}, lon={}", self.lat, self.lon)
    }
}
