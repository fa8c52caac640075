//! House number parsing and side parity policy.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn house_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\D*)(\d+)(\D*)$").expect("static house number pattern"))
}

/// A house number split into prefix, numeric part and suffix.
///
/// `"A10B"` parses as `("A", 10, "B")`, `"10"` as `("", 10, "")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HouseNumber {
    pub prefix: String,
    pub number: i64,
    pub suffix: String,
}

impl HouseNumber {
    /// Parse a house number. Returns `None` if the value does not follow the
    /// prefix + digits + suffix pattern or the digits overflow.
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = house_number_regex().captures(raw.trim())?;
        let number = caps[2].parse::<i64>().ok()?;
        Some(Self {
            prefix: caps[1].to_string(),
            number,
            suffix: caps[3].to_string(),
        })
    }

    /// True when both numbers share prefix and suffix, so the numeric parts
    /// describe positions in the same sequence.
    pub fn same_series(&self, other: &HouseNumber) -> bool {
        self.prefix == other.prefix && self.suffix == other.suffix
    }

    /// Format another number in this house number's series.
    pub fn with_number(&self, number: i64) -> HouseNumber {
        HouseNumber {
            prefix: self.prefix.clone(),
            number,
            suffix: self.suffix.clone(),
        }
    }

    pub fn is_even(&self) -> bool {
        self.number.rem_euclid(2) == 0
    }
}

impl fmt::Display for HouseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.number, self.suffix)
    }
}

/// A parsed from/to address range for one side of a road
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRange {
    pub from: HouseNumber,
    pub to: HouseNumber,
}

impl AddressRange {
    /// Parse both ends. Either end missing or unparsable disables the side.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Option<Self> {
        Some(Self {
            from: HouseNumber::parse(from?)?,
            to: HouseNumber::parse(to?)?,
        })
    }

    pub fn low(&self) -> i64 {
        self.from.number.min(self.to.number)
    }

    pub fn high(&self) -> i64 {
        self.from.number.max(self.to.number)
    }

    /// Ascending when `from` <= `to`
    pub fn is_ascending(&self) -> bool {
        self.from.number <= self.to.number
    }
}

/// Which house numbers of a range are emitted on a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationType {
    Even,
    Odd,
    All,
}

impl InterpolationType {
    /// Classify one side against the opposite side.
    ///
    /// A side is `even` only if both of its ends are even and both ends of the
    /// other side are odd, and vice versa for `odd`. Anything else, including
    /// a missing other side, is `all`.
    pub fn classify(this: (i64, i64), other: Option<(i64, i64)>) -> Self {
        let Some(other) = other else {
            return InterpolationType::All;
        };
        let even = |n: i64| n.rem_euclid(2) == 0;

        if even(this.0) && even(this.1) {
            if !even(other.0) && !even(other.1) {
                return InterpolationType::Even;
            }
        } else if !even(this.0) && !even(this.1) && even(other.0) && even(other.1) {
            return InterpolationType::Odd;
        }
        InterpolationType::All
    }

    /// Classify a side from its parsed range and the optional opposite range.
    pub fn for_side(this: &AddressRange, other: Option<&AddressRange>) -> Self {
        Self::classify(
            (this.from.number, this.to.number),
            other.map(|o| (o.from.number, o.to.number)),
        )
    }

    pub fn includes(&self, number: i64) -> bool {
        match self {
            InterpolationType::All => true,
            InterpolationType::Even => number.rem_euclid(2) == 0,
            InterpolationType::Odd => number.rem_euclid(2) == 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterpolationType::Even => "even",
            InterpolationType::Odd => "odd",
            InterpolationType::All => "all",
        }
    }
}

impl fmt::Display for InterpolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a raw house number passes the side's parity policy.
/// Values without a parsable numeric part are excluded.
pub fn should_include(raw: &str, policy: InterpolationType) -> bool {
    HouseNumber::parse(raw).is_some_and(|hnr| policy.includes(hnr.number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_number() {
        let hnr = HouseNumber::parse("10").unwrap();
        assert_eq!(hnr.prefix, "");
        assert_eq!(hnr.number, 10);
        assert_eq!(hnr.suffix, "");
    }

    #[test]
    fn test_parse_prefix_and_suffix() {
        let hnr = HouseNumber::parse(" A10B ").unwrap();
        assert_eq!(hnr.prefix, "A");
        assert_eq!(hnr.number, 10);
        assert_eq!(hnr.suffix, "B");
        assert_eq!(hnr.to_string(), "A10B");
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!(HouseNumber::parse("ABC").is_none());
        assert!(HouseNumber::parse("").is_none());
        assert!(HouseNumber::parse("10-12").is_none());
    }

    #[test]
    fn test_range_needs_both_ends() {
        assert!(AddressRange::parse(Some("100"), None).is_none());
        assert!(AddressRange::parse(Some("100"), Some("x")).is_none());
        let range = AddressRange::parse(Some("120"), Some("100")).unwrap();
        assert_eq!(range.low(), 100);
        assert_eq!(range.high(), 120);
        assert!(!range.is_ascending());
    }

    #[test]
    fn test_classify_even() {
        assert_eq!(
            InterpolationType::classify((100, 200), Some((101, 201))),
            InterpolationType::Even
        );
    }

    #[test]
    fn test_classify_odd() {
        assert_eq!(
            InterpolationType::classify((101, 201), Some((100, 200))),
            InterpolationType::Odd
        );
    }

    #[test]
    fn test_classify_mixed_is_all() {
        assert_eq!(
            InterpolationType::classify((100, 201), Some((101, 200))),
            InterpolationType::All
        );
        assert_eq!(
            InterpolationType::classify((100, 200), Some((100, 200))),
            InterpolationType::All
        );
    }

    #[test]
    fn test_classify_without_other_side_is_all() {
        assert_eq!(
            InterpolationType::classify((100, 200), None),
            InterpolationType::All
        );
    }

    #[test]
    fn test_should_include() {
        assert!(should_include("12", InterpolationType::Even));
        assert!(!should_include("13", InterpolationType::Even));
        assert!(should_include("13A", InterpolationType::Odd));
        assert!(should_include("13", InterpolationType::All));
        assert!(!should_include("N/A", InterpolationType::All));
    }
}
