//! The prover-facing type alphabet.
//!
//! Source-language type strings are folded onto a small closed alphabet of
//! abstract B types. The mapping is deliberately coarse: widths collapse
//! (`uint8` … `uint256` are all `Uint`) and anything unrecognized becomes
//! `Opaque` rather than failing, so an exotic author type never blocks the
//! structural checks.

use serde::{Deserialize, Serialize};

/// Abstract type symbol as the prover sees it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BType {
    Addr,
    Uint,
    MapAddrUint,
    MapAddrAddrUint,
    Opaque,
}

impl BType {
    /// Map a source-language type string onto the alphabet.
    ///
    /// Whitespace is insignificant: `mapping(address => uint256)` and
    /// `mapping(address=>uint256)` are the same type.
    pub fn from_source(t: &str) -> Self {
        let t: String = t.chars().filter(|c| !c.is_whitespace()).collect();
        if t == "address" {
            return Self::Addr;
        }
        if t == "uint" || (t.starts_with("uint") && t[4..].chars().all(|c| c.is_ascii_digit())) {
            return Self::Uint;
        }
        if t.starts_with("mapping(address=>mapping(address=>uint") {
            return Self::MapAddrAddrUint;
        }
        if t.starts_with("mapping(address=>uint") {
            return Self::MapAddrUint;
        }
        Self::Opaque
    }

    /// Base atoms implied by a mapping shape.
    ///
    /// The emitted type set must be closed: declaring a map type pulls its
    /// component atoms into the alphabet of the artifact.
    pub fn base_atoms(self) -> &'static [BType] {
        match self {
            Self::MapAddrUint | Self::MapAddrAddrUint => &[Self::Addr, Self::Uint],
            _ => &[],
        }
    }

    /// The prover symbol for this type.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Addr => "t_ADDR",
            Self::Uint => "t_UINT",
            Self::MapAddrUint => "t_MAP_ADDR_UINT",
            Self::MapAddrAddrUint => "t_MAP_ADDR_ADDR_UINT",
            Self::Opaque => "t_OPAQUE",
        }
    }
}

impl std::fmt::Display for BType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
