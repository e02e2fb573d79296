//! Shape errors: inputs that cannot be modeled at all.
//!
//! These abort model construction immediately: the first shape error is
//! reported and nothing downstream runs. They are disjoint from invariant
//! violations, which always construct and are collected exhaustively by the
//! validator.

use crate::version::Version;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// A selector that is not a 4-byte `0x`-hex value.
    #[error("function `{function}`: {reason}")]
    BadSelector { function: String, reason: String },

    /// A version tag that does not parse.
    #[error("{reason}")]
    BadVersion { reason: String },

    /// An identifier that is empty or not `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid {role} identifier `{value}`")]
    BadIdentifier { role: &'static str, value: String },

    /// The same symbol declared twice in one namespace.
    #[error("duplicate {role} declaration `{value}`")]
    DuplicateSymbol { role: &'static str, value: String },

    /// A version block past `current`: the pipeline would silently ignore
    /// it, so it is rejected as author error.
    #[error("version block {version} is beyond current {current}")]
    VersionBeyondCurrent { version: Version, current: Version },

    /// An interface whose member list references an undeclared symbol;
    /// the exported-function derivation would be undefined.
    #[error("interface `{interface}` references undeclared {role} `{member}`")]
    UnknownInterfaceMember {
        interface: String,
        role: &'static str,
        member: String,
    },
}
