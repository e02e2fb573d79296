//! The single-package invariant validator.
//!
//! `validate` is a pure function: it never mutates the model and never
//! raises for invalid input data. Each rule runs unconditionally and
//! appends its findings; the combined list is sorted before returning.

use crate::diagnostic::{Diagnostic, Rule};
use refacet_model::{BType, PackageModel, Selector, SlotId, Version};
use std::collections::BTreeMap;

/// Check every structural invariant of one package model.
///
/// Returns the complete, deterministically ordered list of violations;
/// empty means the model is safe to totalize and emit.
pub fn validate(model: &PackageModel) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    check_selector_injectivity(model, &mut out);
    check_export_derivation(model, &mut out);
    check_storage_totality(model, &mut out);
    check_layout_monotonicity(model, &mut out);
    check_binding_domain(model, &mut out);
    check_binding_range(model, &mut out);
    check_footprint_containment(model, &mut out);
    check_dependency_sanity(model, &mut out);
    out.sort();
    out
}

/// PKG-1: selectors are injective over `exportedFuncs(current)`.
///
/// A collision is reported once per colliding pair, the pair ordered by
/// function id.
fn check_selector_injectivity(model: &PackageModel, out: &mut Vec<Diagnostic>) {
    let mut by_selector: BTreeMap<Selector, Vec<refacet_model::FunctionId>> = BTreeMap::new();
    for fid in model.exported_funcs_at(model.current) {
        if let Some(function) = model.functions.get(&fid) {
            by_selector
                .entry(function.selector)
                .or_default()
                .push(function.id.clone());
        }
    }
    for (selector, group) in by_selector {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                out.push(Diagnostic::new(
                    Rule::SelectorInjectivity,
                    vec![group[i].to_string(), group[j].to_string()],
                    format!(
                        "functions `{}` and `{}` collide on selector {selector}",
                        group[i], group[j]
                    ),
                ));
            }
        }
    }
}

/// PKG-2: the exported-function derivation is well defined: every
/// interface in `exports(v)` is declared and external.
fn check_export_derivation(model: &PackageModel, out: &mut Vec<Diagnostic>) {
    for (version, exported) in &model.exports {
        for iid in exported {
            match model.interfaces.get(iid) {
                None => out.push(Diagnostic::new(
                    Rule::ExportDerivation,
                    vec![iid.to_string(), version.to_string()],
                    format!("version {version} exports undeclared interface `{iid}`"),
                )),
                Some(iface) if iface.kind == refacet_model::InterfaceKind::Internal => {
                    out.push(Diagnostic::new(
                        Rule::ExportDerivation,
                        vec![iid.to_string(), version.to_string()],
                        format!("version {version} exports internal interface `{iid}`"),
                    ))
                }
                Some(_) => {}
            }
        }
    }
}

/// PKG-3: `dom(slotType(v)) = layout(v)` for every version.
fn check_storage_totality(model: &PackageModel, out: &mut Vec<Diagnostic>) {
    let empty_layout = Default::default();
    let empty_types = Default::default();
    let versions: std::collections::BTreeSet<&Version> = model
        .declared_layout
        .keys()
        .chain(model.declared_slot_type.keys())
        .collect();
    for version in versions {
        let layout = model.declared_layout.get(version).unwrap_or(&empty_layout);
        let types = model
            .declared_slot_type
            .get(version)
            .unwrap_or(&empty_types);
        for slot in layout {
            if !types.contains_key(slot) {
                out.push(Diagnostic::new(
                    Rule::StorageTotality,
                    vec![slot.to_string(), version.to_string()],
                    format!("slot `{slot}` is in the {version} layout but has no declared type"),
                ));
            }
        }
        for slot in types.keys() {
            if !layout.contains(slot) {
                out.push(Diagnostic::new(
                    Rule::StorageTotality,
                    vec![slot.to_string(), version.to_string()],
                    format!("slot `{slot}` has a type at {version} but is not in the {version} layout"),
                ));
            }
        }
    }
}

/// PKG-4: grow-only, type-stable storage. A slot re-declared with a
/// different type is reported against the earliest offending pair
/// `(v, w)`: `v` its first declaration, `w` the mutating one.
fn check_layout_monotonicity(model: &PackageModel, out: &mut Vec<Diagnostic>) {
    let mut first_seen: BTreeMap<&SlotId, (Version, BType)> = BTreeMap::new();
    for (version, types) in &model.declared_slot_type {
        for (slot, ty) in types {
            match first_seen.get(slot) {
                Some((origin, original)) if ty != original => {
                    out.push(Diagnostic::new(
                        Rule::LayoutMonotonicity,
                        vec![slot.to_string(), origin.to_string(), version.to_string()],
                        format!(
                            "slot `{slot}` was declared {original} at {origin} but re-declared {ty} at {version}"
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    first_seen.insert(slot, (*version, *ty));
                }
            }
        }
    }
}

/// PKG-5: `dom(ext_to_impl) ⊆ exportedFuncs(current)`.
fn check_binding_domain(model: &PackageModel, out: &mut Vec<Diagnostic>) {
    let exported = model.exported_funcs_at(model.current);
    for function in model.bindings.keys() {
        if !exported.contains(function) {
            out.push(Diagnostic::new(
                Rule::BindingDomain,
                vec![function.to_string()],
                format!(
                    "bound function `{function}` is not exported at {}",
                    model.current
                ),
            ));
        }
    }
}

/// PKG-6: `ran(ext_to_impl) ⊆ dom(facetOf)`: every binding target is a
/// declared implementation (which structurally carries its facet).
fn check_binding_range(model: &PackageModel, out: &mut Vec<Diagnostic>) {
    for (function, implementation) in &model.bindings {
        if !model.implementations.contains_key(implementation) {
            out.push(Diagnostic::new(
                Rule::BindingRange,
                vec![implementation.to_string(), function.to_string()],
                format!(
                    "binding for `{function}` targets undeclared implementation `{implementation}`"
                ),
            ));
        }
    }
}

/// PKG-7: every accessed slot is allocated: `reads ∪ writes` of each
/// implementation stays inside `cumulativeLayout(current)`.
fn check_footprint_containment(model: &PackageModel, out: &mut Vec<Diagnostic>) {
    let layout = model.cumulative_layout_at(model.current);
    for (id, implementation) in &model.implementations {
        for slot in implementation.reads.union(&implementation.writes) {
            if !layout.contains(slot) {
                out.push(Diagnostic::new(
                    Rule::FootprintContainment,
                    vec![id.to_string(), slot.to_string()],
                    format!("implementation `{id}` accesses undeclared slot `{slot}`"),
                ));
            }
        }
    }
}

/// PKG-8: no self-dependency. Resolution of foreign requirements needs
/// the composition registry and is checked there.
fn check_dependency_sanity(model: &PackageModel, out: &mut Vec<Diagnostic>) {
    if model.requires.contains_key(&model.name) {
        out.push(Diagnostic::new(
            Rule::DependencySanity,
            vec![model.name.to_string()],
            format!("package `{}` requires itself", model.name),
        ));
    }
}
