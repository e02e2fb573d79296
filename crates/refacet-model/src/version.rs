//! Totally ordered version tags.
//!
//! Versions are `v1 < v2 < …`. A package designates one `current` version;
//! only versions up to `current` are meaningful. Authors declare per-version
//! deltas; the totalizer folds them into cumulative relations.

use serde::{Deserialize, Serialize};

/// A version tag `v<N>` with `N >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u32);

impl Version {
    /// The first version of any package.
    pub const FIRST: Version = Version(1);

    /// Construct from a 1-based ordinal. Returns None for zero.
    pub fn new(n: u32) -> Option<Self> {
        (n >= 1).then_some(Self(n))
    }

    pub fn ordinal(self) -> u32 {
        self.0
    }

    /// The previous version, if this is not `v1`.
    pub fn prev(self) -> Option<Version> {
        (self.0 > 1).then(|| Version(self.0 - 1))
    }

    /// Every version from `v1` up to and including `self`, ascending.
    pub fn walk(self) -> impl Iterator<Item = Version> {
        (1..=self.0).map(Version)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl std::str::FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('v')
            .ok_or_else(|| format!("version tag `{s}` must look like v1, v2, …"))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("version tag `{s}` must look like v1, v2, …"));
        }
        let n: u32 = digits
            .parse()
            .map_err(|_| format!("version tag `{s}` must look like v1, v2, …"))?;
        Version::new(n).ok_or_else(|| format!("version tag `{s}` must be v1 or later"))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::FIRST
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_order() {
        let v1: Version = "v1".parse().unwrap();
        let v2: Version = "v2".parse().unwrap();
        let v10: Version = "v10".parse().unwrap();
        assert!(v1 < v2);
        assert!(v2 < v10);
        assert_eq!(v1, Version::FIRST);
    }

    #[test]
    fn rejects_bad_tags() {
        assert!("v0".parse::<Version>().is_err());
        assert!("1".parse::<Version>().is_err());
        assert!("version1".parse::<Version>().is_err());
        assert!("v".parse::<Version>().is_err());
    }

    #[test]
    fn walk_covers_full_range() {
        let v3: Version = "v3".parse().unwrap();
        let tags: Vec<String> = v3.walk().map(|v| v.to_string()).collect();
        assert_eq!(tags, ["v1", "v2", "v3"]);
    }

    #[test]
    fn prev_stops_at_first() {
        let v2: Version = "v2".parse().unwrap();
        assert_eq!(v2.prev(), Some(Version::FIRST));
        assert_eq!(Version::FIRST.prev(), None);
    }
}
