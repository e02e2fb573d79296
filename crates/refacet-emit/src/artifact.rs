//! The artifact emitter.
//!
//! Renders a totalized model into the refinement instance and its glue
//! machine. Both artifacts are produced in one pass over one model, so
//! their cross-references cannot drift apart. Every relation renders as an
//! explicit enumeration, one entry per line, sorted by left then right
//! component; repeated runs on unchanged input are byte-identical.
//!
//! Symbol prefixes at the prover boundary: `f_` functions, `e_` events,
//! `sel_` selectors, `s_` slots. Implementation, facet, package, and
//! version symbols render verbatim.

use crate::totalize::TotalizedModel;
use refacet_model::BType;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// One rendered artifact plus its content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
    /// Lowercase hex SHA-256 of `contents`.
    pub digest: String,
}

impl Artifact {
    fn new(file_name: String, contents: String) -> Self {
        let digest = hex_digest(Sha256::digest(contents.as_bytes()).as_slice());
        Self {
            file_name,
            contents,
            digest,
        }
    }
}

/// The two correlated artifacts of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArtifacts {
    pub refinement: Artifact,
    pub glue: Artifact,
}

/// Render the refinement and glue artifacts.
///
/// Assumes a validated, totalized model; callers must have checked that
/// validation produced no diagnostics before invoking this.
pub fn emit(total: &TotalizedModel<'_>) -> PackageArtifacts {
    let name = total.model.name.as_str();
    PackageArtifacts {
        refinement: Artifact::new(
            format!("PACKAGE_INST_{name}.ref"),
            render_refinement(total),
        ),
        glue: Artifact::new(format!("PACKAGE_GLUE_{name}.mch"), render_glue(total)),
    }
}

const HEADER: &str = "/* generated by refacet; do not edit */\n";

fn render_refinement(total: &TotalizedModel<'_>) -> String {
    let model = total.model;
    let name = model.name.as_str();

    let mut props: Vec<String> = Vec::new();
    props.push(format!("current = {}", model.current));

    for function in model.functions.values() {
        props.push(format!(
            "funSig(f_{}) = ([{}],[{}])",
            function.id,
            types_csv(&function.inputs),
            types_csv(&function.outputs),
        ));
    }
    for event in model.events.values() {
        props.push(format!(
            "eventSig(e_{}) = [{}]",
            event.id,
            types_csv(&event.inputs),
        ));
    }
    for function in model.functions.values() {
        props.push(format!("selector(f_{id}) = sel_{id}", id = function.id));
    }

    for (version, funcs) in &total.exported_funcs {
        let entries: Vec<String> = funcs.iter().map(|f| format!("f_{f}")).collect();
        props.push(enumeration(&format!("exportsAt({version})"), &entries));
    }
    for (version, slots) in &total.cumulative_layout {
        let entries: Vec<String> = slots.iter().map(|s| format!("s_{s}")).collect();
        props.push(enumeration(&format!("layoutAt({version})"), &entries));
    }
    for (version, slot_types) in &total.cumulative_slot_type {
        let entries: Vec<String> = slot_types
            .iter()
            .map(|(slot, ty)| format!("s_{slot}|->{ty}"))
            .collect();
        props.push(enumeration(&format!("slotTypeAt({version})"), &entries));
    }

    let bindings: Vec<String> = model
        .bindings
        .iter()
        .map(|(function, implementation)| format!("f_{function}|->{implementation}"))
        .collect();
    props.push(enumeration("ext_to_impl", &bindings));

    let facets: Vec<String> = model
        .implementations
        .values()
        .map(|im| format!("{}|->{}", im.id, im.facet))
        .collect();
    props.push(enumeration("facetOf", &facets));

    let reads: Vec<String> = model
        .implementations
        .values()
        .flat_map(|im| im.reads.iter().map(move |slot| format!("{}|->s_{slot}", im.id)))
        .collect();
    props.push(enumeration("reads", &reads));

    let writes: Vec<String> = model
        .implementations
        .values()
        .flat_map(|im| im.writes.iter().map(move |slot| format!("{}|->s_{slot}", im.id)))
        .collect();
    props.push(enumeration("writes", &writes));

    let requires: Vec<String> = model
        .requires
        .iter()
        .map(|(package, version)| format!("{package}|->{version}"))
        .collect();
    props.push(enumeration("requires", &requires));

    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str(&format!("REFINEMENT PACKAGE_INST_{name}\n"));
    out.push_str("REFINES PACKAGE_SPEC\n");
    out.push_str(&format!("SEES PACKAGE_GLUE_{name}\n"));
    out.push_str("PROPERTIES\n");
    out.push_str("    ");
    out.push_str(&props.join(" &\n    "));
    out.push('\n');
    out.push_str("INITIALISATION\n");
    out.push_str("    cur := v1\n");
    out.push_str("END\n");
    out
}

fn render_glue(total: &TotalizedModel<'_>) -> String {
    let model = total.model;
    let name = model.name.as_str();

    let funs: Vec<String> = model.functions.keys().map(|f| format!("f_{f}")).collect();
    let events: Vec<String> = model.events.keys().map(|e| format!("e_{e}")).collect();
    let sels: Vec<String> = model.functions.keys().map(|f| format!("sel_{f}")).collect();
    let slots: Vec<String> = model
        .cumulative_layout_at(model.current)
        .iter()
        .map(|s| format!("s_{s}"))
        .collect();
    let types: Vec<String> = type_closure(total).into_iter().map(str::to_string).collect();
    let impls: Vec<String> = model.implementations.keys().map(ToString::to_string).collect();
    let facets: Vec<String> = model
        .implementations
        .values()
        .map(|im| im.facet.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut package_set: BTreeSet<String> = model.requires.keys().map(ToString::to_string).collect();
    package_set.insert(model.name.to_string());
    let packages: Vec<String> = package_set.into_iter().collect();
    let versions: Vec<String> = model.current.walk().map(|v| v.to_string()).collect();

    let sets: [(&str, &[String]); 9] = [
        ("FUNS", &funs),
        ("EVENTS", &events),
        ("SELS", &sels),
        ("SLOTS", &slots),
        ("TYPES", &types),
        ("IMPLS", &impls),
        ("FACETS", &facets),
        ("PACKAGES", &packages),
        ("VERSIONS", &versions),
    ];

    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str(&format!("MACHINE PACKAGE_GLUE_{name}\n"));
    out.push_str("SETS\n");
    for (i, (set, elems)) in sets.iter().enumerate() {
        let sep = if i + 1 == sets.len() { "" } else { ";" };
        if elems.is_empty() {
            // Deferred set: no member symbols exist for it in this package.
            out.push_str(&format!("    {set}{sep}\n"));
        } else {
            out.push_str(&format!("    {set} = {{{}}}{sep}\n", elems.join(", ")));
        }
    }
    out.push_str("CONSTANTS\n");
    out.push_str("    current, funSig, eventSig, selector, exportsAt, layoutAt, slotTypeAt,\n");
    out.push_str("    ext_to_impl, facetOf, reads, writes, requires\n");
    out.push_str("PROPERTIES\n");
    let typings = [
        "current : VERSIONS",
        "funSig : FUNS --> (seq(TYPES) * seq(TYPES))",
        "eventSig : EVENTS --> seq(TYPES)",
        "selector : FUNS --> SELS",
        "exportsAt : VERSIONS --> POW(FUNS)",
        "layoutAt : VERSIONS --> POW(SLOTS)",
        "slotTypeAt : VERSIONS --> (SLOTS +-> TYPES)",
        "ext_to_impl : FUNS +-> IMPLS",
        "facetOf : IMPLS --> FACETS",
        "reads : IMPLS <-> SLOTS",
        "writes : IMPLS <-> SLOTS",
        "requires : PACKAGES +-> VERSIONS",
    ];
    out.push_str("    ");
    out.push_str(&typings.join(" &\n    "));
    out.push('\n');
    out.push_str("END\n");
    out
}

/// Render one relation as a sorted enumeration, one entry per line.
///
/// Entries arrive pre-sorted by construction (ordered maps and sets), but
/// sorting again here keeps the determinism guarantee local to this
/// function rather than spread across every call site.
fn enumeration(name: &str, entries: &[String]) -> String {
    if entries.is_empty() {
        return format!("{name} = {{}}");
    }
    let mut sorted = entries.to_vec();
    sorted.sort();
    let mut out = format!("{name} = {{\n");
    out.push_str("        ");
    out.push_str(&sorted.join(",\n        "));
    out.push_str("\n    }");
    out
}

fn types_csv(types: &[BType]) -> String {
    types
        .iter()
        .map(|t| t.symbol())
        .collect::<Vec<_>>()
        .join(",")
}

/// The closed type alphabet of the package: every type used by a slot,
/// function signature, or event signature, plus the base atoms implied by
/// mapping shapes, sorted by symbol.
fn type_closure(total: &TotalizedModel<'_>) -> BTreeSet<&'static str> {
    let model = total.model;
    let mut used: BTreeSet<BType> = BTreeSet::new();
    for types in model.declared_slot_type.values() {
        used.extend(types.values().copied());
    }
    for function in model.functions.values() {
        used.extend(function.inputs.iter().copied());
        used.extend(function.outputs.iter().copied());
    }
    for event in model.events.values() {
        used.extend(event.inputs.iter().copied());
    }
    let mut closed: BTreeSet<&'static str> = BTreeSet::new();
    for ty in used {
        closed.insert(ty.symbol());
        for atom in ty.base_atoms() {
            closed.insert(atom.symbol());
        }
    }
    closed
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut acc, b| {
        acc.push_str(&format!("{b:02x}"));
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totalize::totalize;
    use refacet_model::{PackageDescription, PackageModel};

    fn token_model() -> PackageModel {
        let desc: PackageDescription = serde_json::from_str(
            r#"{
                "name": "Token",
                "functions": [
                    {"name": "transfer", "selector": "0xa9059cbb",
                     "inputs": ["address", "uint256"], "outputs": ["uint256"]}
                ],
                "events": [
                    {"name": "Transfer", "inputs": ["address", "address", "uint256"]}
                ],
                "interfaces": [
                    {"name": "IToken", "functions": ["transfer"], "events": ["Transfer"]}
                ],
                "versions": [
                    {"version": "v1", "exports": ["IToken"],
                     "slots": [{"slot": "balances", "type": "mapping(address=>uint256)"}]}
                ],
                "implementations": [
                    {"name": "im_transfer", "facet": "F1",
                     "reads": ["balances"], "writes": ["balances"]}
                ],
                "bindings": {"transfer": "im_transfer"}
            }"#,
        )
        .unwrap();
        PackageModel::from_description(&desc).unwrap()
    }

    #[test]
    fn token_refinement_matches_golden_text() {
        let model = token_model();
        let total = totalize(&model);
        let artifacts = emit(&total);

        let expected = "\
/* generated by refacet; do not edit */
REFINEMENT PACKAGE_INST_Token
REFINES PACKAGE_SPEC
SEES PACKAGE_GLUE_Token
PROPERTIES
    current = v1 &
    funSig(f_transfer) = ([t_ADDR,t_UINT],[t_UINT]) &
    eventSig(e_Transfer) = [t_ADDR,t_ADDR,t_UINT] &
    selector(f_transfer) = sel_transfer &
    exportsAt(v1) = {
        f_transfer
    } &
    layoutAt(v1) = {
        s_balances
    } &
    slotTypeAt(v1) = {
        s_balances|->t_MAP_ADDR_UINT
    } &
    ext_to_impl = {
        f_transfer|->im_transfer
    } &
    facetOf = {
        im_transfer|->F1
    } &
    reads = {
        im_transfer|->s_balances
    } &
    writes = {
        im_transfer|->s_balances
    } &
    requires = {}
INITIALISATION
    cur := v1
END
";
        assert_eq!(artifacts.refinement.contents, expected);
        assert_eq!(artifacts.refinement.file_name, "PACKAGE_INST_Token.ref");
    }

    #[test]
    fn token_glue_matches_golden_text() {
        let model = token_model();
        let total = totalize(&model);
        let artifacts = emit(&total);

        let expected = "\
/* generated by refacet; do not edit */
MACHINE PACKAGE_GLUE_Token
SETS
    FUNS = {f_transfer};
    EVENTS = {e_Transfer};
    SELS = {sel_transfer};
    SLOTS = {s_balances};
    TYPES = {t_ADDR, t_MAP_ADDR_UINT, t_UINT};
    IMPLS = {im_transfer};
    FACETS = {F1};
    PACKAGES = {Token};
    VERSIONS = {v1}
CONSTANTS
    current, funSig, eventSig, selector, exportsAt, layoutAt, slotTypeAt,
    ext_to_impl, facetOf, reads, writes, requires
PROPERTIES
    current : VERSIONS &
    funSig : FUNS --> (seq(TYPES) * seq(TYPES)) &
    eventSig : EVENTS --> seq(TYPES) &
    selector : FUNS --> SELS &
    exportsAt : VERSIONS --> POW(FUNS) &
    layoutAt : VERSIONS --> POW(SLOTS) &
    slotTypeAt : VERSIONS --> (SLOTS +-> TYPES) &
    ext_to_impl : FUNS +-> IMPLS &
    facetOf : IMPLS --> FACETS &
    reads : IMPLS <-> SLOTS &
    writes : IMPLS <-> SLOTS &
    requires : PACKAGES +-> VERSIONS
END
";
        assert_eq!(artifacts.glue.contents, expected);
        assert_eq!(artifacts.glue.file_name, "PACKAGE_GLUE_Token.mch");
    }

    #[test]
    fn emission_is_deterministic() {
        let model = token_model();
        let first = emit(&totalize(&model));
        let second = emit(&totalize(&model));
        assert_eq!(first.refinement.contents, second.refinement.contents);
        assert_eq!(first.glue.contents, second.glue.contents);
        assert_eq!(first.refinement.digest, second.refinement.digest);
        assert_eq!(first.glue.digest, second.glue.digest);
        assert_eq!(first.refinement.digest.len(), 64);
    }

    #[test]
    fn empty_delta_versions_still_get_entries() {
        let desc: PackageDescription = serde_json::from_str(
            r#"{
                "name": "Gap",
                "versions": [
                    {"version": "v1", "exports": [],
                     "slots": [{"slot": "state", "type": "uint256"}]},
                    {"version": "v3", "exports": [], "slots": []}
                ]
            }"#,
        )
        .unwrap();
        let model = PackageModel::from_description(&desc).unwrap();
        let total = totalize(&model);
        let text = &emit(&total).refinement.contents;
        // v2 has no declared block at all, yet its total maps are present.
        assert!(text.contains("exportsAt(v2) = {}"));
        assert!(text.contains("layoutAt(v2) = {\n        s_state\n    }"));
        assert!(text.contains("slotTypeAt(v3) = {\n        s_state|->t_UINT\n    }"));
    }

    #[test]
    fn artifacts_share_symbols() {
        let model = token_model();
        let artifacts = emit(&totalize(&model));
        for symbol in ["f_transfer", "s_balances", "im_transfer", "F1", "v1"] {
            assert!(artifacts.refinement.contents.contains(symbol));
            assert!(artifacts.glue.contents.contains(symbol));
        }
    }

    #[test]
    fn glue_defers_sets_with_no_symbols() {
        let desc: PackageDescription = serde_json::from_str(
            r#"{"name": "Bare", "versions": [{"version": "v1", "exports": [], "slots": []}]}"#,
        )
        .unwrap();
        let model = PackageModel::from_description(&desc).unwrap();
        let text = &emit(&totalize(&model)).glue.contents;
        assert!(text.contains("    FUNS;\n"));
        assert!(text.contains("    EVENTS;\n"));
        assert!(text.contains("    PACKAGES = {Bare};\n"));
        assert!(text.contains("    VERSIONS = {v1}\n"));
    }
}
