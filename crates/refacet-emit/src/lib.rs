//! # Refacet Emit
//!
//! The back half of the pipeline: totalize a validated model, then render
//! it into the two prover-facing artifacts.
//!
//! ```text
//! PackageModel ──totalize──▸ TotalizedModel ──emit──▸ (refinement, glue)
//! ```
//!
//! The totalizer folds the author's per-version deltas into the complete,
//! cumulative relations a prover expects; the emitter renders them as
//! sorted pair enumerations so that repeated runs on unchanged input
//! produce byte-identical text. Both steps assume validation already
//! passed: callers gate on an empty diagnostics list, and neither step
//! re-checks invariants.

pub mod artifact;
pub mod totalize;

pub use artifact::{Artifact, PackageArtifacts, emit};
pub use totalize::{TotalizedModel, totalize};
