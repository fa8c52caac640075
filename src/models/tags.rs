//! Attribute set attached to a TIGER road feature.

use super::house_number::AddressRange;

/// Tags of one input feature.
///
/// Equality covers every field, so two features with the same way id but
/// different attributes never end up in the same way group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TigerTags {
    /// TIGER line id (`TLID`), mandatory
    pub way_id: i64,
    pub name: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub lfromadd: Option<String>,
    pub ltoadd: Option<String>,
    pub rfromadd: Option<String>,
    pub rtoadd: Option<String>,
    pub zip_left: Option<String>,
    pub zip_right: Option<String>,
    pub zip4_left: Option<String>,
    pub zip4_right: Option<String>,
}

/// Road side relative to the direction of travel along a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

impl TigerTags {
    pub fn new(way_id: i64) -> Self {
        Self {
            way_id,
            ..Self::default()
        }
    }

    /// Raw from/to values for a side
    pub fn raw_range(&self, side: Side) -> (Option<&str>, Option<&str>) {
        match side {
            Side::Left => (self.lfromadd.as_deref(), self.ltoadd.as_deref()),
            Side::Right => (self.rfromadd.as_deref(), self.rtoadd.as_deref()),
        }
    }

    /// Parsed address range for a side, if both ends are present and numeric.
    pub fn range(&self, side: Side) -> Option<AddressRange> {
        let (from, to) = self.raw_range(side);
        AddressRange::parse(from, to)
    }

    pub fn zip(&self, side: Side) -> Option<&str> {
        match side {
            Side::Left => self.zip_left.as_deref(),
            Side::Right => self.zip_right.as_deref(),
        }
    }

    pub fn zip4(&self, side: Side) -> Option<&str> {
        match side {
            Side::Left => self.zip4_left.as_deref(),
            Side::Right => self.zip4_right.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_per_side() {
        let mut tags = TigerTags::new(1);
        tags.lfromadd = Some("101".to_string());
        tags.ltoadd = Some("199".to_string());
        tags.rfromadd = Some("100".to_string());

        assert!(tags.range(Side::Left).is_some());
        assert!(tags.range(Side::Right).is_none());
    }

    #[test]
    fn test_tags_differ_by_attribute() {
        let a = TigerTags::new(7);
        let mut b = TigerTags::new(7);
        b.name = Some("Holly St".to_string());
        assert_ne!(a, b);
        assert_eq!(Side::Left.opposite(), Side::Right);
    }
}
