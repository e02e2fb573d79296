//! Four-byte dispatch selectors.
//!
//! Authors supply selectors as `0x` plus eight hex digits. Anything else is
//! a shape error: a selector of the wrong width cannot be modeled at all.

use serde::{Deserialize, Serialize};

/// A function's 4-byte dispatch selector.
///
/// Parsed case-insensitively, rendered lowercase. Uniqueness among exported
/// functions is the validator's concern, not a parsing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "0x{:02x}{:02x}{:02x}{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl std::str::FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| format!("selector `{s}` must start with 0x"))?;
        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("selector `{s}` must be 0x plus 8 hex digits"));
        }
        let mut bytes = [0u8; 4];
        for (i, pair) in digits.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(pair).expect("checked ascii");
            bytes[i] = u8::from_str_radix(pair, 16).expect("checked hex");
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Selector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_render() {
        let sel: Selector = "0xa9059cbb".parse().unwrap();
        assert_eq!(sel.as_bytes(), &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(sel.to_string(), "0xa9059cbb");
    }

    #[test]
    fn parse_is_case_insensitive() {
        let sel: Selector = "0xA9059CBB".parse().unwrap();
        assert_eq!(sel.to_string(), "0xa9059cbb");
    }

    #[test]
    fn rejects_wrong_width() {
        assert!("0xa9059c".parse::<Selector>().is_err());
        assert!("0xa9059cbb00".parse::<Selector>().is_err());
    }

    #[test]
    fn rejects_missing_prefix_and_bad_digits() {
        assert!("a9059cbb".parse::<Selector>().is_err());
        assert!("0xa9059cbg".parse::<Selector>().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let sel: Selector = "0x23b872dd".parse().unwrap();
        let json = serde_json::to_string(&sel).unwrap();
        assert_eq!(json, "\"0x23b872dd\"");
        let back: Selector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sel);
    }
}
