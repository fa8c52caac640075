//! Offset geometry: address lines drawn parallel to a road centerline.
//!
//! All distance math happens in feet. Degrees of latitude have a fixed length
//! in feet; degrees of longitude shrink with latitude, so each vertex gets its
//! own longitude scale. The result is an address line of constant width
//! regardless of where on the globe the road lies.
//!
//! Both ends of each address line are pulled back along the road so that
//! addresses do not sit beyond the end of the street. Interior vertices use a
//! miter join so the line keeps its distance through curves.
//!
//! Known limitation: on very tight curves the offset line can fold over
//! itself and form a small loop.

use std::f64::consts::FRAC_PI_2;

use geo::{Centroid, MultiPoint};
use serde::Deserialize;

use super::nodes::IdCounter;
use crate::error::{Error, Result};
use crate::models::{Node, Point, Side};

/// Default distance of the address lines from the centerline, in feet
pub const ADDRESS_DISTANCE: f64 = 30.0;

/// Default pullback of the address line ends, in feet
pub const ADDRESS_PULLBACK: f64 = 45.0;

/// Approximate number of feet in one degree of latitude
pub const LAT_FEET: f64 = 364_613.0;

/// Approximate number of feet in one degree of longitude at a latitude
pub fn lon_feet(lat: f64) -> f64 {
    let rad = lat.to_radians();
    365_527.822 * rad.cos() - 306.758_53 * (3.0 * rad).cos() + 0.3937 * (5.0 * rad).cos()
}

/// Ground distance in feet between two points, scaled at one longitude factor
fn feet_between(a: &Point, b: &Point, lon_scale: f64) -> f64 {
    ((a.lat - b.lat) * LAT_FEET).hypot((a.lon - b.lon) * lon_scale)
}

/// Length of a chain in feet
pub fn chain_length(chain: &[Node]) -> f64 {
    chain
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0].point, &pair[1].point);
            feet_between(cur, prev, lon_feet(cur.lat))
        })
        .sum()
}

/// Pullback actually applied to a chain.
///
/// Chains shorter than three times the pullback are only pulled back by a
/// third of their length, so short blocks keep a usable middle part.
pub fn effective_pullback(length: f64, pullback: f64) -> f64 {
    if length < pullback * 3.0 {
        length / 3.0
    } else {
        pullback
    }
}

/// Distances used when drawing address lines
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OffsetSettings {
    /// Distance from the centerline, in feet
    pub distance_ft: f64,
    /// Pullback of both ends, in feet
    pub pullback_ft: f64,
}

impl Default for OffsetSettings {
    fn default() -> Self {
        Self {
            distance_ft: ADDRESS_DISTANCE,
            pullback_ft: ADDRESS_PULLBACK,
        }
    }
}

impl OffsetSettings {
    pub fn new(distance_ft: f64, pullback_ft: f64) -> Result<Self> {
        let settings = Self {
            distance_ft,
            pullback_ft,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.distance_ft.is_finite() || self.distance_ft <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "offset distance must be a positive number of feet, got {}",
                self.distance_ft
            )));
        }
        if !self.pullback_ft.is_finite() || self.pullback_ft < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "pullback must be zero or a positive number of feet, got {}",
                self.pullback_ft
            )));
        }
        Ok(())
    }
}

/// Which sides of a chain get an address line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledSides {
    pub left: bool,
    pub right: bool,
}

impl EnabledSides {
    pub fn any(&self) -> bool {
        self.left || self.right
    }
}

/// One address line: generated ids with their positions, in travel order
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetWay {
    pub side: Side,
    pub nodes: Vec<(u64, Point)>,
}

impl OffsetWay {
    pub fn coordinates(&self) -> Vec<Point> {
        self.nodes.iter().map(|(_, p)| *p).collect()
    }

    /// Arithmetic mean of the line's points
    pub fn centroid(&self) -> Option<Point> {
        let points: MultiPoint<f64> = self
            .nodes
            .iter()
            .map(|(_, p)| geo::Point::new(p.lon, p.lat))
            .collect();
        points.centroid().map(|c| Point::new(c.y(), c.x()))
    }

    /// Well-known text, `LINESTRING(lon lat,lon lat,...)` with six decimals
    pub fn to_wkt(&self) -> String {
        let coords: Vec<String> = self
            .nodes
            .iter()
            .map(|(_, p)| format!("{:.6} {:.6}", p.lon, p.lat))
            .collect();
        format!("LINESTRING({})", coords.join(","))
    }
}

/// Left and right address lines of one chain
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OffsetPair {
    pub left: Option<OffsetWay>,
    pub right: Option<OffsetWay>,
}

impl OffsetPair {
    pub fn side(&self, side: Side) -> Option<&OffsetWay> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }
}

/// Perpendicular offset (north, east) in feet for the edge `prev -> cur`,
/// pointing to the left of the direction of travel.
fn perpendicular(prev: &Point, cur: &Point, lon_scale: f64, distance: f64) -> (f64, f64) {
    let x = (cur.lon - prev.lon) * lon_scale;
    let y = (cur.lat - prev.lat) * LAT_FEET;

    let (mut xp, mut yp) = if y != 0.0 {
        let theta = FRAC_PI_2 - (x / y).atan();
        (theta.sin() * distance, theta.cos() * distance)
    } else if x > 0.0 {
        (0.0, -distance)
    } else {
        (0.0, distance)
    };

    if y > 0.0 {
        xp = -xp;
    } else {
        yp = -yp;
    }
    (yp, xp)
}

/// Miter factor between the previous and the current offset direction
fn miter_factor(previous: (f64, f64), current: (f64, f64)) -> f64 {
    let (prev_y, prev_x) = previous;
    let (cur_y, cur_x) = current;

    let mut theta = if prev_x != 0.0 {
        (prev_y / prev_x).atan().abs()
    } else {
        FRAC_PI_2
    };
    theta -= if cur_x != 0.0 {
        (cur_y / cur_x).atan().abs()
    } else {
        FRAC_PI_2
    };
    1.0 + (theta / 2.0).tan().abs()
}

/// Accumulates the points of both address lines while walking a chain
struct Builder<'a> {
    ids: &'a mut IdCounter,
    sides: EnabledSides,
    left: Vec<(u64, Point)>,
    right: Vec<(u64, Point)>,
}

impl Builder<'_> {
    /// Push `base + offset` on the left and `base - offset + shift` on the
    /// right, where `shift` is applied to both sides.
    fn push(&mut self, base: &Point, offset: (f64, f64), shift: (f64, f64)) {
        let (off_lat, off_lon) = offset;
        let (shift_lat, shift_lon) = shift;
        if self.sides.left {
            let point = Point::new(
                base.lat + off_lat + shift_lat,
                base.lon + off_lon + shift_lon,
            );
            self.left.push((self.ids.next_id(), point));
        }
        if self.sides.right {
            let point = Point::new(
                base.lat - off_lat + shift_lat,
                base.lon - off_lon + shift_lon,
            );
            self.right.push((self.ids.next_id(), point));
        }
    }
}

/// Generate the address lines of one assembled chain.
///
/// Ids are drawn from `ids` in generation order: for every emitted vertex the
/// left point takes an id before the right one. Returns `None` when the chain
/// has no edge to orient an offset by (fewer than two points).
pub fn generate(
    chain: &[Node],
    ids: &mut IdCounter,
    sides: EnabledSides,
    settings: &OffsetSettings,
) -> Option<OffsetPair> {
    let (first, last) = (chain.first()?, chain.last()?);
    if chain.len() < 2 || !sides.any() {
        return None;
    }

    let distance = settings.distance_ft;
    let pullback = effective_pullback(chain_length(chain), settings.pullback_ft);
    let pull = pullback / distance;

    let mut builder = Builder {
        ids,
        sides,
        left: Vec::new(),
        right: Vec::new(),
    };
    let mut previous: Option<Point> = None;
    let mut delta: Option<(f64, f64)> = None;
    let mut lon_scale = lon_feet(first.point.lat);

    for node in chain {
        let point = node.point;
        lon_scale = lon_feet(point.lat);

        let Some(prev) = previous else {
            previous = Some(point);
            continue;
        };

        // Skip points within the pullback of either end, but always keep the
        // chain's own extremities so very short chains survive.
        if feet_between(&point, &first.point, lon_scale) < pullback && node.id != last.id {
            continue;
        }
        if feet_between(&point, &last.point, lon_scale) < pullback
            && node.id != first.id
            && node.id != last.id
        {
            continue;
        }

        let (yp, xp) = perpendicular(&prev, &point, lon_scale, distance);

        match delta {
            None => {
                let shift = (-(xp * pull) / LAT_FEET, (yp * pull) / lon_scale);
                builder.push(&prev, (yp / LAT_FEET, xp / lon_scale), shift);
            }
            Some((prev_yp, prev_xp)) => {
                let r = miter_factor((prev_yp, prev_xp), (yp, xp));
                let offset = (
                    (yp + prev_yp) * r / (LAT_FEET * 2.0),
                    (xp + prev_xp) * r / (lon_scale * 2.0),
                );
                builder.push(&prev, offset, (0.0, 0.0));
            }
        }

        delta = Some((yp, xp));
        previous = Some(point);
    }

    let ((yp, xp), end) = (delta?, previous?);
    let shift = ((xp * pull) / LAT_FEET, -(yp * pull) / lon_scale);
    builder.push(&end, (yp / LAT_FEET, xp / lon_scale), shift);

    let Builder { left, right, .. } = builder;
    Some(OffsetPair {
        left: sides.left.then(|| OffsetWay {
            side: Side::Left,
            nodes: left,
        }),
        right: sides.right.then(|| OffsetWay {
            side: Side::Right,
            nodes: right,
        }),
    })
}
