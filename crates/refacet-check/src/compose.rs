//! Diamond-composition validation.
//!
//! Cross-package checks run as a separate, explicit pass over the union of
//! already-validated single-package models, never folded into
//! single-package validation. The pass is a pure, synchronous fold: no
//! state is shared beyond the borrowed models.

use crate::diagnostic::{Diagnostic, Rule};
use refacet_model::{PackageId, PackageModel, Selector, SlotId, Version};
use std::collections::{BTreeMap, BTreeSet};

/// Check selector disjointness, storage disjointness, and dependency
/// resolution across a set of packages composed behind one proxy.
///
/// Callers validate each member first; this pass assumes per-package
/// soundness and only judges the composition.
pub fn validate_composition(models: &[&PackageModel]) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    check_selector_disjointness(models, &mut out);
    check_storage_disjointness(models, &mut out);
    check_requires_resolution(models, &mut out);
    out.sort();
    out
}

/// DIA-1: the selectors of exported functions are injective across the
/// whole composition. Same-package collisions are PKG-1's business and
/// are not repeated here.
fn check_selector_disjointness(models: &[&PackageModel], out: &mut Vec<Diagnostic>) {
    let mut by_selector: BTreeMap<Selector, Vec<(PackageId, String)>> = BTreeMap::new();
    for model in models {
        for fid in model.exported_funcs_at(model.current) {
            if let Some(function) = model.functions.get(&fid) {
                by_selector
                    .entry(function.selector)
                    .or_default()
                    .push((model.name.clone(), fid.to_string()));
            }
        }
    }
    for (selector, group) in by_selector {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let (pa, fa) = &group[i];
                let (pb, fb) = &group[j];
                if pa == pb {
                    continue;
                }
                let mut pair = [format!("{pa}.{fa}"), format!("{pb}.{fb}")];
                pair.sort();
                out.push(Diagnostic::new(
                    Rule::CompositionSelectorOverlap,
                    pair.to_vec(),
                    format!(
                        "exported functions `{}` and `{}` collide on selector {selector}",
                        pair[0], pair[1]
                    ),
                ));
            }
        }
    }
}

/// DIA-2: cumulative storage layouts at `current` are pairwise disjoint.
fn check_storage_disjointness(models: &[&PackageModel], out: &mut Vec<Diagnostic>) {
    let mut by_slot: BTreeMap<SlotId, BTreeSet<PackageId>> = BTreeMap::new();
    for model in models {
        for slot in model.cumulative_layout_at(model.current) {
            by_slot.entry(slot).or_default().insert(model.name.clone());
        }
    }
    for (slot, packages) in by_slot {
        if packages.len() > 1 {
            let owners: Vec<String> = packages.iter().map(ToString::to_string).collect();
            let mut entities = vec![slot.to_string()];
            entities.extend(owners.iter().cloned());
            out.push(Diagnostic::new(
                Rule::CompositionStorageOverlap,
                entities,
                format!(
                    "slot `{slot}` is allocated by more than one package: {}",
                    owners.join(", ")
                ),
            ));
        }
    }
}

/// DIA-3: every `requires` entry names a package in the composition whose
/// `current` satisfies the minimum version. Self-references are PKG-8's.
fn check_requires_resolution(models: &[&PackageModel], out: &mut Vec<Diagnostic>) {
    let currents: BTreeMap<&PackageId, Version> =
        models.iter().map(|m| (&m.name, m.current)).collect();
    for model in models {
        for (dep, minimum) in &model.requires {
            if *dep == model.name {
                continue;
            }
            match currents.get(dep) {
                None => out.push(Diagnostic::new(
                    Rule::CompositionRequiresUnresolved,
                    vec![model.name.to_string(), dep.to_string()],
                    format!(
                        "package `{}` requires `{dep}` {minimum}, which is not part of the composition",
                        model.name
                    ),
                )),
                Some(current) if current < minimum => out.push(Diagnostic::new(
                    Rule::CompositionRequiresUnresolved,
                    vec![model.name.to_string(), dep.to_string()],
                    format!(
                        "package `{}` requires `{dep}` {minimum}, but the composition provides {current}",
                        model.name
                    ),
                )),
                Some(_) => {}
            }
        }
    }
}
