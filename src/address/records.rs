//! Flat output records: one per house number, or one per address range.

use serde::Serialize;
use tracing::{debug, warn};

use super::interpolate::{centroid, interpolate};
use super::offset::OffsetWay;
use crate::lookup::ZipCodeLookup;
use crate::models::{round_to, should_include, AddressRange, InterpolationType, Side, TigerTags};
use crate::models::point::OUTPUT_PRECISION;

/// Column order of the per-address-point CSV
pub const POINT_HEADERS: [&str; 9] = [
    "hnr", "lat", "lon", "street", "county", "city", "state", "postcode", "zip4",
];

/// Column order of the per-range CSV
pub const RANGE_HEADERS: [&str; 13] = [
    "from",
    "to",
    "interpolation",
    "lat",
    "lon",
    "street",
    "county",
    "city",
    "state",
    "postcode",
    "zip4",
    "geometry",
    "way",
];

/// One house number placed on an address line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressPoint {
    pub hnr: String,
    pub lat: f64,
    pub lon: f64,
    pub street: String,
    pub county: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub zip4: String,
}

/// Numbering direction of a range along its address line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// `from` <= `to`
    #[serde(rename = "F")]
    Forward,
    /// `from` > `to`
    #[serde(rename = "R")]
    Reverse,
}

/// One side of one chain, summarized as a range with its geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressRangeRecord {
    pub from: String,
    pub to: String,
    pub interpolation: InterpolationType,
    pub lat: f64,
    pub lon: f64,
    pub street: String,
    pub county: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub zip4: String,
    pub geometry: String,
    pub way: Direction,
}

/// Descriptive fields shared by every record of one side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideAttributes {
    pub street: String,
    pub county: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub zip4: String,
}

impl SideAttributes {
    /// Collect the side's attributes and resolve its city from the ZIP code
    pub fn resolve(tags: &TigerTags, side: Side, zips: &ZipCodeLookup) -> Self {
        let postcode = tags.zip(side).unwrap_or_default().to_string();
        let city = match zips.fallback_city(&postcode) {
            Some(city) => city,
            None if postcode.is_empty() => {
                debug!("Way {}: no {} ZIP code, city left empty", tags.way_id, side);
                String::new()
            }
            None => {
                warn!(
                    "Way {}: no city found for ZIP {} ({} side)",
                    tags.way_id, postcode, side
                );
                String::new()
            }
        };

        Self {
            street: tags.name.clone().unwrap_or_default(),
            county: tags.county.clone().unwrap_or_default(),
            city,
            state: tags.state.clone().unwrap_or_default(),
            postcode,
            zip4: tags.zip4(side).unwrap_or_default().to_string(),
        }
    }

    fn point(&self, hnr: String, lat: f64, lon: f64) -> AddressPoint {
        AddressPoint {
            hnr,
            lat: round_to(lat, OUTPUT_PRECISION),
            lon: round_to(lon, OUTPUT_PRECISION),
            street: self.street.clone(),
            county: self.county.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postcode: self.postcode.clone(),
            zip4: self.zip4.clone(),
        }
    }
}

/// One record per eligible house number of a side.
///
/// Numbers in `[min(from, to), max(from, to)]` that pass the side's parity
/// policy are placed by arc length. A range whose ends do not share a
/// prefix and suffix cannot be enumerated and yields a single record with the
/// `from` number at the line's centroid.
pub fn point_records(
    way: &OffsetWay,
    range: &AddressRange,
    policy: InterpolationType,
    attributes: &SideAttributes,
) -> Vec<AddressPoint> {
    let coordinates = way.coordinates();

    if !range.from.same_series(&range.to) {
        debug!(
            "Range {}-{} mixes prefixes or suffixes, placing a single point",
            range.from, range.to
        );
        return centroid(&coordinates)
            .map(|c| attributes.point(range.from.to_string(), c.lat, c.lon))
            .into_iter()
            .collect();
    }

    (range.low()..=range.high())
        .filter_map(|n| {
            let hnr = range.from.with_number(n).to_string();
            if !should_include(&hnr, policy) {
                return None;
            }
            let position = interpolate(&coordinates, range.from.number, range.to.number, n)?;
            Some(attributes.point(hnr, position.lat, position.lon))
        })
        .collect()
}

/// The range record of a side, carrying the full address line
pub fn range_record(
    way: &OffsetWay,
    range: &AddressRange,
    policy: InterpolationType,
    attributes: &SideAttributes,
) -> Option<AddressRangeRecord> {
    let center = way.centroid()?;
    let attributes = attributes.clone();

    Some(AddressRangeRecord {
        from: range.from.to_string(),
        to: range.to.to_string(),
        interpolation: policy,
        lat: round_to(center.lat, OUTPUT_PRECISION),
        lon: round_to(center.lon, OUTPUT_PRECISION),
        street: attributes.street,
        county: attributes.county,
        city: attributes.city,
        state: attributes.state,
        postcode: attributes.postcode,
        zip4: attributes.zip4,
        geometry: way.to_wkt(),
        way: if range.is_ascending() {
            Direction::Forward
        } else {
            Direction::Reverse
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn way() -> OffsetWay {
        OffsetWay {
            side: Side::Right,
            nodes: vec![
                (1, Point::new(38.900, -77.0)),
                (2, Point::new(38.901, -77.0)),
                (3, Point::new(38.902, -77.0)),
            ],
        }
    }

    fn tags() -> TigerTags {
        let mut tags = TigerTags::new(42);
        tags.name = Some("Holly St".to_string());
        tags.county = Some("Perquimans".to_string());
        tags.state = Some("NC".to_string());
        tags.zip_right = Some("27944".to_string());
        tags.zip4_right = Some("1234".to_string());
        tags
    }

    fn zips() -> ZipCodeLookup {
        ZipCodeLookup::from_reader("zip,primary_city\n27944,Hertford\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_side_attributes() {
        let attrs = SideAttributes::resolve(&tags(), Side::Right, &zips());
        assert_eq!(attrs.city, "Hertford");
        assert_eq!(attrs.postcode, "27944");
        assert_eq!(attrs.zip4, "1234");

        let left = SideAttributes::resolve(&tags(), Side::Left, &zips());
        assert_eq!(left.city, "");
        assert_eq!(left.postcode, "");
        assert_eq!(left.street, "Holly St");
    }

    #[test]
    fn test_point_records_follow_parity() {
        let range = AddressRange::parse(Some("100"), Some("110")).unwrap();
        let attrs = SideAttributes::resolve(&tags(), Side::Right, &zips());
        let records = point_records(&way(), &range, InterpolationType::Even, &attrs);

        let numbers: Vec<&str> = records.iter().map(|r| r.hnr.as_str()).collect();
        assert_eq!(numbers, vec!["100", "102", "104", "106", "108", "110"]);
        assert_eq!(records[0].lat, 38.9);
        assert_eq!(records[5].lat, 38.902);
        assert_eq!(records[0].city, "Hertford");
    }

    #[test]
    fn test_point_records_keep_suffix() {
        let range = AddressRange::parse(Some("1A"), Some("3A")).unwrap();
        let attrs = SideAttributes::default();
        let records = point_records(&way(), &range, InterpolationType::All, &attrs);
        let numbers: Vec<&str> = records.iter().map(|r| r.hnr.as_str()).collect();
        assert_eq!(numbers, vec!["1A", "2A", "3A"]);
    }

    #[test]
    fn test_mixed_series_is_single_centroid_point() {
        let range = AddressRange::parse(Some("1A"), Some("9B")).unwrap();
        let attrs = SideAttributes::default();
        let records = point_records(&way(), &range, InterpolationType::All, &attrs);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hnr, "1A");
        assert_eq!(records[0].lat, 38.901);
    }

    #[test]
    fn test_descending_range_record() {
        let range = AddressRange::parse(Some("110"), Some("100")).unwrap();
        let attrs = SideAttributes::resolve(&tags(), Side::Right, &zips());
        let record = range_record(&way(), &range, InterpolationType::Even, &attrs).unwrap();

        assert_eq!(record.from, "110");
        assert_eq!(record.to, "100");
        assert_eq!(record.way, Direction::Reverse);
        assert_eq!(record.lat, 38.901);
        assert_eq!(record.lon, -77.0);
        assert_eq!(
            record.geometry,
            "LINESTRING(-77.000000 38.900000,-77.000000 38.901000,-77.000000 38.902000)"
        );
    }

    #[test]
    fn test_headers_match_serialized_fields() {
        let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(vec![]);
        writer
            .serialize(AddressPoint {
                hnr: "1".to_string(),
                lat: 1.0,
                lon: 2.0,
                street: String::new(),
                county: String::new(),
                city: String::new(),
                state: String::new(),
                postcode: String::new(),
                zip4: String::new(),
            })
            .unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out.lines().next().unwrap(), POINT_HEADERS.join(";"));
    }
}
