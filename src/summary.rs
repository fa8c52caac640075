//! Centroids of converted address ranges, per postcode or per street.
//!
//! Every range row contributes the middle vertex of its address line. The
//! points of a key are reduced to one centroid that ignores outliers: start
//! at the per-axis median and keep the points within a growing radius until
//! at least 70% of them survive.

use csv::ReaderBuilder;
use geo::{Centroid, MultiPoint};
use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wkt::TryFromWkt;

use crate::error::{Error, Result};
use crate::models::round_to;
use crate::models::point::OUTPUT_PRECISION;

/// Search radii in degrees, tried in order
pub const MAX_DISTANCES: [f64; 4] = [0.1, 0.3, 0.5, 0.9];

/// Share of a key's points that must lie within the radius
pub const KEEP_RATIO: f64 = 0.7;

const PROGRESS_EVERY: u64 = 1_000_000;

/// The columns of a range record read back for aggregation
#[derive(Debug, Clone, Deserialize)]
pub struct RangeRow {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    pub geometry: String,
}

/// How rows are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKey {
    /// `city:county:state:postcode`, five digit postcodes only
    Postcode,
    /// `street;city:state:postcode`, named streets only
    Street,
}

impl SummaryKey {
    /// Lowercased grouping key of a row, `None` when the row does not take part
    pub fn key(&self, row: &RangeRow) -> Option<String> {
        match self {
            SummaryKey::Postcode => {
                let postcode = row.postcode.as_str();
                if postcode.len() != 5 || !postcode.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Some(
                    format!("{}:{}:{}:{}", row.city, row.county, row.state, postcode)
                        .to_lowercase(),
                )
            }
            SummaryKey::Street => {
                if row.street.is_empty() {
                    return None;
                }
                Some(
                    format!("{};{}:{}:{}", row.street, row.city, row.state, row.postcode)
                        .to_lowercase(),
                )
            }
        }
    }
}

/// Middle vertex (`points[len / 2]`) of a `LINESTRING`
pub fn middle_point(geometry: &str, row: u64) -> Result<Coord<f64>> {
    let line = LineString::<f64>::try_from_wkt_str(geometry).map_err(|e| {
        Error::InvalidGeometry {
            row,
            reason: e.to_string(),
        }
    })?;
    line.0
        .get(line.0.len() / 2)
        .copied()
        .ok_or_else(|| Error::InvalidGeometry {
            row,
            reason: "empty line".to_string(),
        })
}

/// Read `;` delimited range records and collect the middle points per key
pub fn collect_points<R: Read>(
    reader: R,
    key: SummaryKey,
) -> Result<BTreeMap<String, Vec<Coord<f64>>>> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut groups: BTreeMap<String, Vec<Coord<f64>>> = BTreeMap::new();
    let mut count: u64 = 0;

    for (index, result) in csv_reader.deserialize::<RangeRow>().enumerate() {
        let row: RangeRow = result?;
        // Concatenated outputs repeat their header
        if row.geometry == "geometry" {
            continue;
        }
        let Some(group_key) = key.key(&row) else {
            continue;
        };

        let point = middle_point(&row.geometry, index as u64 + 1)?;
        groups.entry(group_key).or_default().push(point);

        count += 1;
        if count % PROGRESS_EVERY == 0 {
            info!("Processed {} lines", count);
        }
    }

    info!("{} lines read, {} keys", count, groups.len());
    Ok(groups)
}

/// Median of a non-empty sample; the mean of the two middle values for even
/// sizes
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn mean(points: &[Coord<f64>]) -> Option<Coord<f64>> {
    let points: MultiPoint<f64> = points.iter().map(|c| geo::Point::from(*c)).collect();
    points.centroid().map(|p| p.0)
}

/// Centroid of `points` without outliers, `None` when the points are too
/// scattered for every radius.
pub fn robust_centroid(key: &str, points: &[Coord<f64>]) -> Option<Coord<f64>> {
    if points.is_empty() {
        return None;
    }
    let center = Coord {
        x: median(points.iter().map(|c| c.x).collect()),
        y: median(points.iter().map(|c| c.y).collect()),
    };

    for max_distance in MAX_DISTANCES {
        let kept: Vec<Coord<f64>> = points
            .iter()
            .filter(|c| (c.x - center.x).hypot(c.y - center.y) < max_distance)
            .copied()
            .collect();
        if (kept.len() as f64) < KEEP_RATIO * points.len() as f64 {
            continue;
        }
        if kept.len() < points.len() {
            warn!(
                "{}: found {} outliers in {} points",
                key,
                points.len() - kept.len(),
                points.len()
            );
        }
        return mean(&kept);
    }

    warn!("{}: dropped", key);
    None
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostcodeCentroid {
    pub postcode: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreetCentroid {
    pub street: String,
    pub lat: f64,
    pub lon: f64,
}

/// One centroid per postcode key, in key order
pub fn postcode_centroids(groups: &BTreeMap<String, Vec<Coord<f64>>>) -> Vec<PostcodeCentroid> {
    groups
        .iter()
        .filter_map(|(key, points)| {
            let center = robust_centroid(key, points)?;
            // city:county:state:postcode; the city may itself contain ':'
            let mut parts = key.rsplitn(4, ':');
            let postcode = parts.next()?.to_string();
            let state = parts.next()?.to_string();
            let county = parts.next()?.to_string();
            let city = parts.next()?.to_string();
            Some(PostcodeCentroid {
                postcode,
                city,
                county,
                state,
                lat: round_to(center.y, OUTPUT_PRECISION),
                lon: round_to(center.x, OUTPUT_PRECISION),
            })
        })
        .collect()
}

/// One centroid per street key, in key order
pub fn street_centroids(groups: &BTreeMap<String, Vec<Coord<f64>>>) -> Vec<StreetCentroid> {
    groups
        .iter()
        .filter_map(|(key, points)| {
            let center = robust_centroid(key, points)?;
            Some(StreetCentroid {
                street: key.clone(),
                lat: round_to(center.y, OUTPUT_PRECISION),
                lon: round_to(center.x, OUTPUT_PRECISION),
            })
        })
        .collect()
}

/// `<output_dir>/<input stem>_postals.csv`
pub fn postcode_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output_dir.join(format!("{}_postals.csv", stem))
}
