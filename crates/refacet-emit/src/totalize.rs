//! The version totalizer.
//!
//! Authors declare only the delta each version introduces; provers want
//! the complete picture at every version. Because storage is grow-only,
//! each version's complete state is the previous complete state plus that
//! version's delta, so one forward fold over `v1..=current` suffices
//! (O(V) rather than re-deriving per version).

use refacet_model::{BType, FunctionId, PackageModel, SlotId, Version};
use std::collections::{BTreeMap, BTreeSet};

/// The totalized view of a validated model: every version from `v1` to
/// `current` has an entry, even when its declared delta was empty.
#[derive(Debug, Clone)]
pub struct TotalizedModel<'a> {
    pub model: &'a PackageModel,

    /// `cumulativeLayout(v)`: all slots allocated at or before `v`.
    pub cumulative_layout: BTreeMap<Version, BTreeSet<SlotId>>,

    /// `cumulativeSlotType(v)`: the type of every slot in
    /// `cumulativeLayout(v)`.
    pub cumulative_slot_type: BTreeMap<Version, BTreeMap<SlotId, BType>>,

    /// `exportedFuncs(v)`: the deduplicated union of the function sets of
    /// the interfaces exported at `v`.
    pub exported_funcs: BTreeMap<Version, BTreeSet<FunctionId>>,
}

/// Fold a validated model into its totalized form.
///
/// Assumes validation passed: conflicting slot re-declarations were
/// already rejected, so merging type deltas is a plain extend.
pub fn totalize(model: &PackageModel) -> TotalizedModel<'_> {
    let mut cumulative_layout = BTreeMap::new();
    let mut cumulative_slot_type = BTreeMap::new();
    let mut exported_funcs = BTreeMap::new();

    let mut layout: BTreeSet<SlotId> = BTreeSet::new();
    let mut slot_type: BTreeMap<SlotId, BType> = BTreeMap::new();

    for version in model.current.walk() {
        if let Some(delta) = model.declared_layout.get(&version) {
            layout.extend(delta.iter().cloned());
        }
        if let Some(delta) = model.declared_slot_type.get(&version) {
            slot_type.extend(delta.iter().map(|(s, t)| (s.clone(), *t)));
        }
        cumulative_layout.insert(version, layout.clone());
        cumulative_slot_type.insert(version, slot_type.clone());
        exported_funcs.insert(version, model.exported_funcs_at(version));
    }

    TotalizedModel {
        model,
        cumulative_layout,
        cumulative_slot_type,
        exported_funcs,
    }
}
