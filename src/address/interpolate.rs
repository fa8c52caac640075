//! Places house numbers along an address line by arc length.

use crate::models::Point;

/// Arithmetic mean of the coordinates
pub fn centroid(coordinates: &[Point]) -> Option<Point> {
    if coordinates.is_empty() {
        return None;
    }
    let count = coordinates.len() as f64;
    let (lat, lon) = coordinates
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));
    Some(Point::new(lat / count, lon / count))
}

/// Position of `target` on the line, proportional to its place in the range.
///
/// The range may run in either direction; the ends are ordered before the
/// ratio is taken. A single-number range, or a target outside the range,
/// falls back to the centroid of the coordinates. Distances are planar on the
/// raw degree values.
///
/// Returns `None` only for an empty coordinate list.
pub fn interpolate(coordinates: &[Point], from: i64, to: i64, target: i64) -> Option<Point> {
    let (low, high) = if to < from { (to, from) } else { (from, to) };
    if coordinates.len() < 2 || low == high || target < low || target > high {
        return centroid(coordinates);
    }

    let total: f64 = coordinates
        .windows(2)
        .map(|pair| pair[0].planar_distance(&pair[1]))
        .sum();
    if total == 0.0 {
        return centroid(coordinates);
    }

    let ratio = (target - low) as f64 / (high - low) as f64;
    let target_length = ratio * total;
    let mut walked = 0.0;

    for pair in coordinates.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        let length = start.planar_distance(end);
        if length > 0.0 && walked + length >= target_length {
            let t = (target_length - walked) / length;
            return Some(Point::new(
                start.lat + t * (end.lat - start.lat),
                start.lon + t * (end.lon - start.lon),
            ));
        }
        walked += length;
    }

    coordinates.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Vec<Point> {
        // Two legs of length 1 and 3, total 4
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 3.0),
        ]
    }

    fn close(a: Point, lat: f64, lon: f64) -> bool {
        (a.lat - lat).abs() < 1e-9 && (a.lon - lon).abs() < 1e-9
    }

    #[test]
    fn test_midpoint_is_half_the_length() {
        let p = interpolate(&line(), 100, 200, 150).unwrap();
        assert!(close(p, 1.0, 1.0));
    }

    #[test]
    fn test_ends() {
        assert!(close(interpolate(&line(), 100, 200, 100).unwrap(), 0.0, 0.0));
        assert!(close(interpolate(&line(), 100, 200, 200).unwrap(), 1.0, 3.0));
    }

    #[test]
    fn test_descending_range_uses_ordered_ends() {
        let p = interpolate(&line(), 200, 100, 125).unwrap();
        assert!(close(p, 1.0, 0.0));
    }

    #[test]
    fn test_single_number_range_is_centroid() {
        let c = centroid(&line()).unwrap();
        for target in [0, 100, 5000] {
            let p = interpolate(&line(), 100, 100, target).unwrap();
            assert!(close(p, c.lat, c.lon));
        }
    }

    #[test]
    fn test_out_of_range_is_centroid() {
        let c = centroid(&line()).unwrap();
        let p = interpolate(&line(), 100, 200, 250).unwrap();
        assert!(close(p, c.lat, c.lon));
    }

    #[test]
    fn test_repeated_points_are_skipped() {
        let coords = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 2.0),
        ];
        let p = interpolate(&coords, 0, 10, 5).unwrap();
        assert!(close(p, 0.0, 1.0));
    }

    #[test]
    fn test_empty_and_single() {
        assert!(interpolate(&[], 1, 3, 2).is_none());
        let single = [Point::new(4.0, 5.0)];
        assert!(close(interpolate(&single, 1, 3, 2).unwrap(), 4.0, 5.0));
    }
}
