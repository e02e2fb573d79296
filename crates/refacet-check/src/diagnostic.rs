//! Diagnostics: one polymorphic record per violation.
//!
//! Instead of a distinct error type per rule there is a single diagnostic
//! shape carrying a rule tag plus the offending entity identifiers; easy
//! to aggregate, sort, and test exhaustively. Reports are sorted by rule
//! reference, then entities, then message, so repeated runs on identical
//! input produce identical output.

use serde::{Deserialize, Serialize};

/// The closed set of structural rules.
///
/// Declaration order is the required check order; `PKG-*` references sort
/// the same way lexically, so diagnostic ordering and check ordering agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    /// Selectors are injective over the functions exported at `current`.
    SelectorInjectivity,
    /// Every exported interface is declared and external, so the derived
    /// exported-function set is well defined.
    ExportDerivation,
    /// Each version's slot-type map covers exactly its layout.
    StorageTotality,
    /// A slot never changes type across the version chain.
    LayoutMonotonicity,
    /// Bound functions are exported at `current`.
    BindingDomain,
    /// Bound implementations are declared (and therefore faceted).
    BindingRange,
    /// Read/write footprints stay inside the allocated layout.
    FootprintContainment,
    /// A package never requires itself.
    DependencySanity,

    /// Composition: exported selectors are disjoint across packages.
    CompositionSelectorOverlap,
    /// Composition: storage layouts are disjoint across packages.
    CompositionStorageOverlap,
    /// Composition: every required package/version is present.
    CompositionRequiresUnresolved,
}

impl Rule {
    /// Stable rule reference, e.g. `PKG-1`.
    pub fn rule_ref(self) -> &'static str {
        match self {
            Self::SelectorInjectivity => "PKG-1",
            Self::ExportDerivation => "PKG-2",
            Self::StorageTotality => "PKG-3",
            Self::LayoutMonotonicity => "PKG-4",
            Self::BindingDomain => "PKG-5",
            Self::BindingRange => "PKG-6",
            Self::FootprintContainment => "PKG-7",
            Self::DependencySanity => "PKG-8",
            Self::CompositionSelectorOverlap => "DIA-1",
            Self::CompositionStorageOverlap => "DIA-2",
            Self::CompositionRequiresUnresolved => "DIA-3",
        }
    }

    /// Failure classification string.
    pub fn class(self) -> &'static str {
        match self {
            Self::SelectorInjectivity => "selector_collision",
            Self::ExportDerivation => "export_derivation_undefined",
            Self::StorageTotality => "storage_totality_violation",
            Self::LayoutMonotonicity => "slot_type_mutated",
            Self::BindingDomain => "binding_unexported_function",
            Self::BindingRange => "binding_unknown_implementation",
            Self::FootprintContainment => "footprint_undeclared_slot",
            Self::DependencySanity => "dependency_self_reference",
            Self::CompositionSelectorOverlap => "composition_selector_overlap",
            Self::CompositionStorageOverlap => "composition_storage_overlap",
            Self::CompositionRequiresUnresolved => "composition_requires_unresolved",
        }
    }
}

/// One structural violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Stable rule reference (`PKG-1` … `PKG-8`, `DIA-1` … `DIA-3`).
    pub rule: String,

    /// Failure classification.
    pub class: String,

    /// The offending entity identifiers, most specific first.
    pub entities: Vec<String>,

    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new(rule: Rule, entities: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.rule_ref().to_string(),
            class: rule.class().to_string(),
            entities,
            message: message.into(),
        }
    }

    fn sort_key(&self) -> (&str, &[String], &str) {
        (&self.rule, &self.entities, &self.message)
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.rule,
            self.class,
            self.message,
            self.entities.join(", ")
        )
    }
}
