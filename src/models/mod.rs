//! Core data models for the address conversion.

pub mod house_number;
pub mod point;
pub mod tags;

pub use house_number::{should_include, AddressRange, HouseNumber, InterpolationType};
pub use point::{round_to, Node, Point, PointKey, RawPoint};
pub use tags::{Side, TigerTags};

/// One input feature: centerline fragment plus its tags
#[derive(Debug, Clone)]
pub struct Feature {
    pub points: Vec<RawPoint>,
    pub tags: TigerTags,
}

/// Ordered raw points of one centerline fragment or assembled chain
pub type Segment = Vec<RawPoint>;
