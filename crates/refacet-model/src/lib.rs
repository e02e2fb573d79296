//! # Refacet Model
//!
//! The in-memory ontology of a contract package: interfaces, functions,
//! events, storage slots, versions, implementations, facets, and the
//! relations between them.
//!
//! ## Architecture
//!
//! ```text
//! PackageDescription    ← author-facing, partial (per-version deltas)
//!     │ from_description (shape errors only)
//! PackageModel          ← immutable, indexed, relation-complete
//! ```
//!
//! Construction fails only on malformed *shape*: a selector that is not
//! four bytes, a version tag that does not parse, a duplicate symbol.
//! Semantic invariant violations (dangling bindings, selector collisions,
//! storage regressions) construct fine and are the validator's business:
//! shape errors mean "this input cannot even be modeled", invariant
//! violations mean "this input models a package that is unsafe".

pub mod btype;
pub mod description;
pub mod error;
pub mod ids;
pub mod model;
pub mod selector;
pub mod version;

pub use btype::BType;
pub use description::{
    DependencyDecl, EventDecl, FunctionDecl, ImplDecl, InterfaceDecl, InterfaceKind,
    PackageDescription, SlotDecl, VersionBlock,
};
pub use error::ShapeError;
pub use ids::{EventId, FacetId, FunctionId, ImplId, InterfaceId, PackageId, SlotId};
pub use model::{Event, Function, Implementation, Interface, PackageModel};
pub use selector::Selector;
pub use version::Version;
