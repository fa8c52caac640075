//! Coordinate types shared by the conversion pipeline.

use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Decimal places used when comparing points for identity.
pub const IDENTITY_PRECISION: i32 = 8;

/// Decimal places used for coordinates in output records.
pub const OUTPUT_PRECISION: i32 = 6;

/// Geographic point (lat/lon) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance on the raw degree values, without any feet scaling.
    pub fn planar_distance(&self, other: &Point) -> f64 {
        (self.lat - other.lat).hypot(self.lon - other.lon)
    }

    /// Round both components to the output precision.
    pub fn rounded(&self) -> Point {
        Point {
            lat: round_to(self.lat, OUTPUT_PRECISION),
            lon: round_to(self.lon, OUTPUT_PRECISION),
        }
    }
}

/// Point as read from the input, in the source projection (x = easting, y = northing)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPoint {
    pub x: f64,
    pub y: f64,
}

impl RawPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Identity key of this point, rounded to [`IDENTITY_PRECISION`] places.
    pub fn key(&self) -> PointKey {
        PointKey::from_raw(self)
    }
}

impl From<Coord<f64>> for RawPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
        }
    }
}

/// Hashable identity of a rounded point.
///
/// Stores the coordinates scaled by 10^8 and rounded to integers, so two raw
/// points map to the same key exactly when they agree to eight decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey(i64, i64);

impl PointKey {
    pub fn from_raw(point: &RawPoint) -> Self {
        let scale = 10f64.powi(IDENTITY_PRECISION);
        Self(
            (point.x * scale).round() as i64,
            (point.y * scale).round() as i64,
        )
    }
}

/// A registered point: stable integer id plus its unprojected position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: u64,
    pub point: Point,
}

/// Round a value to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
