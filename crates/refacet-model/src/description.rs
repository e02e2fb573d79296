//! Author-facing package description.
//!
//! This is the parsed shape of the source text: partial and incremental by
//! design. Authors declare only the delta each version introduces; history
//! is never restated. The description is turned into a [`PackageModel`]
//! by [`PackageModel::from_description`], which is where shape checking
//! happens; deserialization itself stays permissive.
//!
//! [`PackageModel`]: crate::model::PackageModel
//! [`PackageModel::from_description`]: crate::model::PackageModel::from_description

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete package description as authored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescription {
    /// Package identity, e.g. `Token`.
    pub name: String,

    #[serde(default)]
    pub functions: Vec<FunctionDecl>,

    #[serde(default)]
    pub events: Vec<EventDecl>,

    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,

    /// One block per version, each listing the interfaces exported at that
    /// version and the storage slots it newly introduces.
    #[serde(default)]
    pub versions: Vec<VersionBlock>,

    #[serde(default)]
    pub implementations: Vec<ImplDecl>,

    /// Function name → implementation name.
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,

    #[serde(default)]
    pub depends_on: Vec<DependencyDecl>,

    /// The live version. Defaults to the highest declared version block.
    #[serde(default)]
    pub current: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    pub name: String,
    /// `0x` plus eight hex digits.
    pub selector: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDecl {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub kind: InterfaceKind,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

/// Whether an interface may appear in a version's export set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    #[default]
    External,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBlock {
    /// `v1`, `v2`, …
    pub version: String,
    /// Interfaces exported at this version.
    #[serde(default)]
    pub exports: Vec<String>,
    /// Slots newly introduced at this version.
    #[serde(default)]
    pub slots: Vec<SlotDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDecl {
    pub slot: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplDecl {
    pub name: String,
    pub facet: String,
    #[serde(default)]
    pub reads: Vec<String>,
    #[serde(default)]
    pub writes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDecl {
    pub name: String,
    /// Minimum required version of the dependency. Defaults to `v1`.
    #[serde(default)]
    pub version: Option<String>,
}
