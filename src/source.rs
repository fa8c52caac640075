//! Reads TIGER/Line road features from a delimited text export.
//!
//! Each row carries a `LINESTRING` geometry (column `WKT` or `geometry`) in
//! the source projection and the ADDRFEAT/EDGES attribute columns. A row
//! without a way id or with unusable geometry aborts the read.

use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use geo_types::LineString;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};
use wkt::TryFromWkt;

use crate::error::{Error, Result};
use crate::lookup::{extract_fips_code, CountyLookup, CountyState};
use crate::models::{Feature, RawPoint, TigerTags};

const GEOMETRY_COLUMNS: [&str; 2] = ["WKT", "geometry"];

/// Address columns: preferred column, fallback column
const LFROM: (&str, &str) = ("LFROMHN", "LFROMADD");
const LTO: (&str, &str) = ("LTOHN", "LTOADD");
const RFROM: (&str, &str) = ("RFROMHN", "RFROMADD");
const RTO: (&str, &str) = ("RTOHN", "RTOADD");

/// Column positions resolved once from the header row
struct Columns {
    geometry: usize,
    tlid: usize,
    fullname: Option<usize>,
    lfrom: (Option<usize>, Option<usize>),
    lto: (Option<usize>, Option<usize>),
    rfrom: (Option<usize>, Option<usize>),
    rto: (Option<usize>, Option<usize>),
    zipl: Option<usize>,
    zipr: Option<usize>,
    plus4l: Option<usize>,
    plus4r: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let pair = |(primary, fallback): (&str, &str)| (find(primary), find(fallback));

        let geometry = GEOMETRY_COLUMNS
            .iter()
            .find_map(|name| find(name))
            .ok_or_else(|| Error::MissingColumn(GEOMETRY_COLUMNS.join("|")))?;
        let tlid = find("TLID").ok_or_else(|| Error::MissingColumn("TLID".to_string()))?;

        Ok(Self {
            geometry,
            tlid,
            fullname: find("FULLNAME"),
            lfrom: pair(LFROM),
            lto: pair(LTO),
            rfrom: pair(RFROM),
            rto: pair(RTO),
            zipl: find("ZIPL"),
            zipr: find("ZIPR"),
            plus4l: find("PLUS4L"),
            plus4r: find("PLUS4R"),
        })
    }
}

/// Non-empty, trimmed value of an optional column
fn field(record: &StringRecord, column: Option<usize>) -> Option<String> {
    let value = record.get(column?)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Value of the preferred column, falling back to the second when empty
fn field_with_fallback(
    record: &StringRecord,
    (primary, fallback): (Option<usize>, Option<usize>),
) -> Option<String> {
    field(record, primary).or_else(|| field(record, fallback))
}

fn parse_geometry(text: &str, row: u64) -> Result<Vec<RawPoint>> {
    let line = LineString::<f64>::try_from_wkt_str(text).map_err(|e| Error::InvalidGeometry {
        row,
        reason: e.to_string(),
    })?;
    let points: Vec<RawPoint> = line.coords().map(|c| RawPoint::from(*c)).collect();
    if points.len() < 2 {
        return Err(Error::InvalidGeometry {
            row,
            reason: format!("line has {} point(s), need at least 2", points.len()),
        });
    }
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(Error::InvalidGeometry {
            row,
            reason: "non-finite coordinate".to_string(),
        });
    }
    Ok(points)
}

fn parse_feature(
    record: &StringRecord,
    columns: &Columns,
    county: Option<&CountyState>,
    row: u64,
) -> Result<Feature> {
    let way_id = record
        .get(columns.tlid)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or(Error::MissingWayId { row })?;

    let geometry = record.get(columns.geometry).unwrap_or_default();
    let points = parse_geometry(geometry, row)?;

    let tags = TigerTags {
        way_id,
        name: field(record, columns.fullname),
        county: county.map(|c| c.county.clone()),
        state: county.map(|c| c.state.clone()),
        lfromadd: field_with_fallback(record, columns.lfrom),
        ltoadd: field_with_fallback(record, columns.lto),
        rfromadd: field_with_fallback(record, columns.rfrom),
        rtoadd: field_with_fallback(record, columns.rto),
        zip_left: field(record, columns.zipl),
        zip_right: field(record, columns.zipr),
        zip4_left: field(record, columns.plus4l),
        zip4_right: field(record, columns.plus4r),
    };

    Ok(Feature { points, tags })
}

/// Read all features from a reader. `county` fills the county and state tags
/// of every feature.
pub fn read_features_from<R: Read>(reader: R, county: Option<&CountyState>) -> Result<Vec<Feature>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(csv_reader.headers()?)?;

    let mut features = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let row = index as u64 + 1;
        features.push(parse_feature(&record, &columns, county, row)?);
    }
    Ok(features)
}

/// Read all features of a TIGER/Line export (optionally gzipped).
///
/// County and state are looked up from the FIPS code in the file name.
pub fn read_features(path: &Path, counties: &CountyLookup) -> Result<Vec<Feature>> {
    info!("Reading features from {}", path.display());

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let county = match extract_fips_code(file_name) {
        Some(fips) => {
            let county = counties.get(&fips);
            if county.is_none() {
                warn!("No county entry for FIPS {}", fips);
            }
            county
        }
        None => {
            warn!(
                "No FIPS code in file name {}, county and state left empty",
                file_name
            );
            None
        }
    };

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let features = read_features_from(reader, county.as_ref())?;
    info!("Read {} features", features.len());
    Ok(features)
}
