//! Published version numbers
//!
//! The store exchanges versions as decimal strings. Inside the core they are
//! positive integers; parsing and formatting happen only at the store
//! boundary.

use crate::errors::VersionParseError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::str::FromStr;

/// A published version number (never zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(NonZeroU64);

impl Version {
    /// Build a version from a raw number, `None` for zero
    pub fn new(n: u64) -> Option<Self> {
        NonZeroU64::new(n).map(Version)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Parse the decimal wire form
    ///
    /// Only ASCII digits are accepted: no sign, no whitespace, and no
    /// qualifiers such as `$LATEST`. Leading zeros are tolerated.
    ///
    /// # Errors
    ///
    /// Returns a [`VersionParseError`] describing why `s` is not a version.
    pub fn parse(s: &str) -> Result<Self, VersionParseError> {
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VersionParseError::InvalidDigit {
                value: s.to_string(),
            });
        }
        let n: u64 = s.parse().map_err(|_| VersionParseError::Overflow {
            value: s.to_string(),
        })?;
        Version::new(n).ok_or(VersionParseError::Zero)
    }

    /// The next lower version number, `None` below 1
    pub fn predecessor(self) -> Option<Version> {
        Version::new(self.get() - 1)
    }

    /// Every lower version number, nearest first, ending at 1
    pub fn predecessors(self) -> impl Iterator<Item = Version> {
        std::iter::successors(self.predecessor(), |v| v.predecessor())
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Version::parse(&s)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u64) -> Version {
        Version::new(n).unwrap()
    }

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(Version::parse("5").unwrap(), v(5));
        assert_eq!(Version::parse("007").unwrap(), v(7));
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        assert_eq!(
            Version::parse("5a"),
            Err(VersionParseError::InvalidDigit {
                value: "5a".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_qualifiers_and_signs() {
        for s in ["$LATEST", "-3", "+3", " 3", "3 ", "3.0"] {
            assert!(
                matches!(
                    Version::parse(s),
                    Err(VersionParseError::InvalidDigit { .. })
                ),
                "{s:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_rejects_empty_and_zero() {
        assert_eq!(Version::parse(""), Err(VersionParseError::Empty));
        assert_eq!(Version::parse("0"), Err(VersionParseError::Zero));
        assert_eq!(Version::parse("000"), Err(VersionParseError::Zero));
    }

    #[test]
    fn test_parse_overflow() {
        assert!(matches!(
            Version::parse("18446744073709551616"),
            Err(VersionParseError::Overflow { .. })
        ));
    }

    #[test]
    fn test_predecessors_stop_at_one() {
        let seen: Vec<u64> = v(4).predecessors().map(Version::get).collect();
        assert_eq!(seen, vec![3, 2, 1]);
        assert_eq!(v(1).predecessors().count(), 0);
    }

    #[test]
    fn test_display_is_decimal() {
        assert_eq!(v(42).to_string(), "42");
        assert_eq!(String::from(v(42)), "42");
    }

    #[test]
    fn test_serde_uses_wire_string() {
        let json = serde_json::to_string(&v(12)).unwrap();
        assert_eq!(json, "\"12\"");
        let back: Version = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(back, v(12));
        assert!(serde_json::from_str::<Version>("\"0\"").is_err());
    }
}
