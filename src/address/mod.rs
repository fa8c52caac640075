//! Address line generation for TIGER road centerlines.
//!
//! Features are grouped by tag set and assembled into chains, each chain gets
//! a left and right address line, and the lines are turned into either one
//! record per house number or one record per range.

pub mod assemble;
mod context;
pub mod grouping;
pub mod interpolate;
pub mod nodes;
pub mod offset;
pub mod records;

pub use assemble::{adjacent, assemble, splice};
pub use context::{plan_sides, RunContext, SidePlan};
pub use grouping::{group, WayGroup, WayGrouper};
pub use interpolate::interpolate;
pub use nodes::{IdCounter, NodeRegistry};
pub use offset::{generate, EnabledSides, OffsetPair, OffsetSettings, OffsetWay};
pub use records::{AddressPoint, AddressRangeRecord, Direction, SideAttributes};

use std::slice;
use std::vec;

use crate::lookup::ZipCodeLookup;
use crate::models::{RawPoint, Segment, TigerTags};
use crate::project::Unproject;

/// Records of one chain in per-address-point mode
fn chain_points<T: Unproject>(
    ctx: &mut RunContext<T>,
    tags: &TigerTags,
    chain: &[RawPoint],
    zips: &ZipCodeLookup,
    settings: &OffsetSettings,
) -> Vec<AddressPoint> {
    let Some((plans, pair)) = ctx.offsets(tags, chain, settings) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for plan in &plans {
        if let Some(way) = pair.side(plan.side) {
            let attributes = SideAttributes::resolve(tags, plan.side, zips);
            out.extend(records::point_records(
                way,
                &plan.range,
                plan.policy,
                &attributes,
            ));
        }
    }
    out
}

/// Lazy stream of per-address-point records.
///
/// Chains are processed one at a time as the stream is consumed; address
/// line ids are drawn from the run context in that order. The stream is
/// finite and can only be walked once.
pub struct AddressPoints<'a, T: Unproject> {
    groups: slice::Iter<'a, WayGroup>,
    current: Option<(&'a TigerTags, slice::Iter<'a, Segment>)>,
    pending: vec::IntoIter<AddressPoint>,
    ctx: &'a mut RunContext<T>,
    zips: &'a ZipCodeLookup,
    settings: OffsetSettings,
}

impl<T: Unproject> Iterator for AddressPoints<'_, T> {
    type Item = AddressPoint;

    fn next(&mut self) -> Option<AddressPoint> {
        loop {
            if let Some(record) = self.pending.next() {
                return Some(record);
            }

            let next_chain = self
                .current
                .as_mut()
                .and_then(|(tags, chains)| chains.next().map(|chain| (*tags, chain)));

            match next_chain {
                Some((tags, chain)) => {
                    let records = chain_points(self.ctx, tags, chain, self.zips, &self.settings);
                    self.pending = records.into_iter();
                }
                None => {
                    let group = self.groups.next()?;
                    self.current = Some((&group.tags, group.chains.iter()));
                }
            }
        }
    }
}

/// One record per eligible house number, produced lazily
pub fn address_points<'a, T: Unproject>(
    groups: &'a [WayGroup],
    ctx: &'a mut RunContext<T>,
    zips: &'a ZipCodeLookup,
    settings: OffsetSettings,
) -> AddressPoints<'a, T> {
    AddressPoints {
        groups: groups.iter(),
        current: None,
        pending: Vec::new().into_iter(),
        ctx,
        zips,
        settings,
    }
}

/// One record per addressed side of every chain
pub fn address_ranges<T: Unproject>(
    groups: &[WayGroup],
    ctx: &mut RunContext<T>,
    zips: &ZipCodeLookup,
    settings: &OffsetSettings,
) -> Vec<AddressRangeRecord> {
    let mut out = Vec::new();
    for group in groups {
        for chain in &group.chains {
            let Some((plans, pair)) = ctx.offsets(&group.tags, chain, settings) else {
                continue;
            };
            for plan in &plans {
                let Some(way) = pair.side(plan.side) else {
                    continue;
                };
                let attributes = SideAttributes::resolve(&group.tags, plan.side, zips);
                out.extend(records::range_record(
                    way,
                    &plan.range,
                    plan.policy,
                    &attributes,
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, InterpolationType, RawPoint};
    use crate::project::Projection;

    /// Two fragments of one block, 100-110 on the right and 101-111 on the
    /// left. Assembly starts from the first fragment, so the chain runs south.
    fn block() -> Vec<Feature> {
        let mut tags = TigerTags::new(18403490);
        tags.name = Some("Holly St".to_string());
        tags.county = Some("Perquimans".to_string());
        tags.state = Some("NC".to_string());
        tags.rfromadd = Some("100".to_string());
        tags.rtoadd = Some("110".to_string());
        tags.lfromadd = Some("101".to_string());
        tags.ltoadd = Some("111".to_string());
        tags.zip_right = Some("27944".to_string());
        tags.zip_left = Some("27944".to_string());

        // Listed out of order and against each other to exercise assembly
        vec![
            Feature {
                points: vec![RawPoint::new(-76.5, 36.2030), RawPoint::new(-76.5, 36.2015)],
                tags: tags.clone(),
            },
            Feature {
                points: vec![RawPoint::new(-76.5, 36.2000), RawPoint::new(-76.5, 36.2015)],
                tags,
            },
        ]
    }

    fn zips() -> ZipCodeLookup {
        ZipCodeLookup::from_reader("zip,primary_city\n27944,Hertford\n".as_bytes()).unwrap()
    }

    fn settings() -> OffsetSettings {
        OffsetSettings::new(10.0, 20.0).unwrap()
    }

    #[test]
    fn test_end_to_end_points() {
        let features = block();
        let groups = group(&features);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].chains.len(), 1);
        assert_eq!(groups[0].chains[0].len(), 3);

        let mut ctx = RunContext::build(Projection::Geographic, &features);
        let zips = zips();
        let records: Vec<AddressPoint> =
            address_points(&groups, &mut ctx, &zips, settings()).collect();
        assert_eq!(records.len(), 12);

        let right: Vec<&AddressPoint> = records
            .iter()
            .filter(|r| r.hnr.parse::<i64>().unwrap() % 2 == 0)
            .collect();
        let left: Vec<&AddressPoint> = records
            .iter()
            .filter(|r| r.hnr.parse::<i64>().unwrap() % 2 == 1)
            .collect();

        let right_numbers: Vec<&str> = right.iter().map(|r| r.hnr.as_str()).collect();
        let left_numbers: Vec<&str> = left.iter().map(|r| r.hnr.as_str()).collect();
        assert_eq!(right_numbers, vec!["100", "102", "104", "106", "108", "110"]);
        assert_eq!(left_numbers, vec!["101", "103", "105", "107", "109", "111"]);

        // Right side records come first, then left
        assert_eq!(records[0].hnr, "100");
        assert_eq!(records[6].hnr, "101");
        assert_eq!(records[0].city, "Hertford");
        assert_eq!(records[0].street, "Holly St");

        // Each side moves steadily along its line, never repeating a position
        for side in [&right, &left] {
            let lats: Vec<f64> = side.iter().map(|r| r.lat).collect();
            let increasing = lats.windows(2).all(|w| w[1] > w[0]);
            let decreasing = lats.windows(2).all(|w| w[1] < w[0]);
            assert!(increasing || decreasing, "not monotonic: {:?}", lats);
        }

        // The two sides sit on opposite sides of the road
        assert!(right.iter().all(|r| r.lon != -76.5));
        assert!(left.iter().all(|r| r.lon != -76.5));
        assert!((right[0].lon > -76.5) != (left[0].lon > -76.5));
    }

    #[test]
    fn test_end_to_end_ranges() {
        let features = block();
        let groups = group(&features);
        let mut ctx = RunContext::build(Projection::Geographic, &features);
        let first_id = ctx.next_way_id();
        let records = address_ranges(&groups, &mut ctx, &zips(), &settings());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].from, "100");
        assert_eq!(records[0].to, "110");
        assert_eq!(records[0].interpolation, InterpolationType::Even);
        assert_eq!(records[1].interpolation, InterpolationType::Odd);
        assert_eq!(records[0].way, Direction::Forward);
        // Heading south, the right side lies west of the road
        assert!(records[0].geometry.starts_with("LINESTRING(-76.500034 "));
        assert_eq!(records[0].geometry.matches(',').count(), 2);
        assert_eq!(records[0].city, "Hertford");

        // Three points per side, both sides interleaved on one counter
        assert_eq!(ctx.next_way_id(), first_id + 6);
    }

    #[test]
    fn test_points_stream_is_lazy() {
        let features = block();
        let groups = group(&features);
        let mut ctx = RunContext::build(Projection::Geographic, &features);
        let first_id = ctx.next_way_id();
        let zips = zips();

        let mut stream = address_points(&groups, &mut ctx, &zips, settings());
        assert!(stream.next().is_some());
        drop(stream);
        assert_eq!(ctx.next_way_id(), first_id + 6);
    }
}
