//! Symbol identifiers.
//!
//! Every entity in a package ontology is a named symbol. Identifiers are
//! plain `[A-Za-z_][A-Za-z0-9_]*` names as the author wrote them; the
//! emitter applies rendering prefixes (`f_`, `e_`, `sel_`, `s_`) when the
//! symbols cross into prover notation.

use serde::{Deserialize, Serialize};

macro_rules! symbol_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

symbol_id!(
    /// A function symbol, e.g. `transfer`.
    FunctionId
);
symbol_id!(
    /// An event symbol, e.g. `Transfer`.
    EventId
);
symbol_id!(
    /// An interface symbol, e.g. `IERC20`.
    InterfaceId
);
symbol_id!(
    /// A storage slot symbol, e.g. `balances`.
    SlotId
);
symbol_id!(
    /// An implementation symbol, e.g. `im_transfer`.
    ImplId
);
symbol_id!(
    /// A facet symbol: the deployment grouping an implementation belongs to.
    FacetId
);
symbol_id!(
    /// A package symbol, e.g. `Token`.
    PackageId
);
