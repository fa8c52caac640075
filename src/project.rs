//! Coordinate transformers from the source projection to geographic degrees.

use serde::Deserialize;
use std::f64::consts::PI;

use crate::models::{Point, RawPoint};

/// WGS84 semi-major axis in meters, used by spherical Mercator
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Maps a point from the source projection to geographic latitude/longitude.
///
/// Implementations must be deterministic: the node registry calls this once
/// per distinct rounded point and caches the result for the whole run.
pub trait Unproject {
    fn unproject(&self, raw: RawPoint) -> Point;
}

/// Supported source projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Projection {
    /// Input is already longitude/latitude (TIGER/Line NAD83)
    #[default]
    Geographic,
    /// Spherical Mercator meters (EPSG:3857)
    WebMercator,
}

impl Unproject for Projection {
    fn unproject(&self, raw: RawPoint) -> Point {
        match self {
            Projection::Geographic => Point::new(raw.y, raw.x),
            Projection::WebMercator => {
                let lon = (raw.x / EARTH_RADIUS_M).to_degrees();
                let lat = (2.0 * (raw.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
                Point::new(lat, lon)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_swaps_axes() {
        let p = Projection::Geographic.unproject(RawPoint::new(-76.5, 36.2));
        assert_eq!(p.lat, 36.2);
        assert_eq!(p.lon, -76.5);
    }

    #[test]
    fn test_web_mercator_origin() {
        let p = Projection::WebMercator.unproject(RawPoint::new(0.0, 0.0));
        assert!(p.lat.abs() < 1e-12);
        assert!(p.lon.abs() < 1e-12);
    }

    #[test]
    fn test_web_mercator_known_point() {
        let p = Projection::WebMercator.unproject(RawPoint::new(-8_500_000.0, 4_700_000.0));
        assert!((p.lon - (-76.356_799)).abs() < 1e-5);
        assert!((p.lat - 38.848_544).abs() < 1e-5);
    }
}
