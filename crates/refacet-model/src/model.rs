//! The typed, immutable package model.
//!
//! [`PackageModel::from_description`] is the only place shape checking
//! happens. It resolves the author's partial description into indexed
//! relations and fails fast on the first malformed piece. It does *not*
//! judge semantic invariants; a model with a dangling binding or a
//! selector collision constructs fine and is handed to the validator.
//!
//! All relation fields are public: callers may assemble a model
//! programmatically instead of going through a description, in which case
//! nothing guarantees the relations are mutually consistent, and that is
//! exactly what the validator exists to check.

use crate::btype::BType;
use crate::description::{InterfaceKind, PackageDescription};
use crate::error::ShapeError;
use crate::ids::{EventId, FacetId, FunctionId, ImplId, InterfaceId, PackageId, SlotId};
use crate::selector::Selector;
use crate::version::Version;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub id: FunctionId,
    pub selector: Selector,
    pub inputs: Vec<BType>,
    pub outputs: Vec<BType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub inputs: Vec<BType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub id: InterfaceId,
    pub kind: InterfaceKind,
    pub functions: BTreeSet<FunctionId>,
    pub events: BTreeSet<EventId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Implementation {
    pub id: ImplId,
    /// Every implementation belongs to exactly one facet.
    pub facet: FacetId,
    pub reads: BTreeSet<SlotId>,
    pub writes: BTreeSet<SlotId>,
}

/// The full relational picture of one package at one `current` version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageModel {
    pub name: PackageId,
    pub functions: BTreeMap<FunctionId, Function>,
    pub events: BTreeMap<EventId, Event>,
    pub interfaces: BTreeMap<InterfaceId, Interface>,

    /// Interfaces exported at each version.
    pub exports: BTreeMap<Version, BTreeSet<InterfaceId>>,

    /// Slots newly introduced at each version (incremental, not cumulative).
    pub declared_layout: BTreeMap<Version, BTreeSet<SlotId>>,

    /// Types of the slots introduced at each version.
    pub declared_slot_type: BTreeMap<Version, BTreeMap<SlotId, BType>>,

    pub implementations: BTreeMap<ImplId, Implementation>,

    /// `ext_to_impl`: exported function → implementation.
    pub bindings: BTreeMap<FunctionId, ImplId>,

    /// Required package → minimum version.
    pub requires: BTreeMap<PackageId, Version>,

    pub current: Version,

    /// Derived index: function → interfaces declaring it. Kept alongside the
    /// authored relations so declaring-interface lookup is a direct read.
    pub declared_in: BTreeMap<FunctionId, BTreeSet<InterfaceId>>,
}

impl PackageModel {
    /// Build a model from an authored description.
    ///
    /// Fails on the first shape error; never reports semantic invariant
    /// violations.
    pub fn from_description(desc: &PackageDescription) -> Result<Self, ShapeError> {
        ident("package", &desc.name)?;

        let mut functions = BTreeMap::new();
        for f in &desc.functions {
            ident("function", &f.name)?;
            let selector: Selector = f.selector.parse().map_err(|reason| ShapeError::BadSelector {
                function: f.name.clone(),
                reason,
            })?;
            let id = FunctionId::new(&f.name);
            let entry = Function {
                id: id.clone(),
                selector,
                inputs: f.inputs.iter().map(|t| BType::from_source(t)).collect(),
                outputs: f.outputs.iter().map(|t| BType::from_source(t)).collect(),
            };
            if functions.insert(id, entry).is_some() {
                return Err(duplicate("function", &f.name));
            }
        }

        let mut events = BTreeMap::new();
        for e in &desc.events {
            ident("event", &e.name)?;
            let id = EventId::new(&e.name);
            let entry = Event {
                id: id.clone(),
                inputs: e.inputs.iter().map(|t| BType::from_source(t)).collect(),
            };
            if events.insert(id, entry).is_some() {
                return Err(duplicate("event", &e.name));
            }
        }

        let mut interfaces = BTreeMap::new();
        for i in &desc.interfaces {
            ident("interface", &i.name)?;
            let mut fun_members = BTreeSet::new();
            for f in &i.functions {
                let fid = FunctionId::new(f);
                if !functions.contains_key(&fid) {
                    return Err(ShapeError::UnknownInterfaceMember {
                        interface: i.name.clone(),
                        role: "function",
                        member: f.clone(),
                    });
                }
                fun_members.insert(fid);
            }
            let mut event_members = BTreeSet::new();
            for e in &i.events {
                let eid = EventId::new(e);
                if !events.contains_key(&eid) {
                    return Err(ShapeError::UnknownInterfaceMember {
                        interface: i.name.clone(),
                        role: "event",
                        member: e.clone(),
                    });
                }
                event_members.insert(eid);
            }
            let id = InterfaceId::new(&i.name);
            let entry = Interface {
                id: id.clone(),
                kind: i.kind,
                functions: fun_members,
                events: event_members,
            };
            if interfaces.insert(id, entry).is_some() {
                return Err(duplicate("interface", &i.name));
            }
        }

        let mut exports: BTreeMap<Version, BTreeSet<InterfaceId>> = BTreeMap::new();
        let mut declared_layout: BTreeMap<Version, BTreeSet<SlotId>> = BTreeMap::new();
        let mut declared_slot_type: BTreeMap<Version, BTreeMap<SlotId, BType>> = BTreeMap::new();
        let mut highest = Version::FIRST;
        for block in &desc.versions {
            let version: Version = block
                .version
                .parse()
                .map_err(|reason| ShapeError::BadVersion { reason })?;
            highest = highest.max(version);
            if exports.contains_key(&version) {
                return Err(duplicate("version block", &block.version));
            }
            let mut exported = BTreeSet::new();
            for name in &block.exports {
                ident("interface", name)?;
                exported.insert(InterfaceId::new(name));
            }
            let mut layout = BTreeSet::new();
            let mut slot_types = BTreeMap::new();
            for slot in &block.slots {
                ident("slot", &slot.slot)?;
                let sid = SlotId::new(&slot.slot);
                if !layout.insert(sid.clone()) {
                    return Err(duplicate("slot", &slot.slot));
                }
                slot_types.insert(sid, BType::from_source(&slot.ty));
            }
            exports.insert(version, exported);
            declared_layout.insert(version, layout);
            declared_slot_type.insert(version, slot_types);
        }

        let current = match &desc.current {
            Some(tag) => tag
                .parse()
                .map_err(|reason| ShapeError::BadVersion { reason })?,
            None => highest,
        };
        if let Some(version) = exports.keys().find(|v| **v > current) {
            return Err(ShapeError::VersionBeyondCurrent {
                version: *version,
                current,
            });
        }

        let mut implementations = BTreeMap::new();
        for im in &desc.implementations {
            ident("implementation", &im.name)?;
            ident("facet", &im.facet)?;
            let mut reads = BTreeSet::new();
            for slot in &im.reads {
                ident("slot", slot)?;
                reads.insert(SlotId::new(slot));
            }
            let mut writes = BTreeSet::new();
            for slot in &im.writes {
                ident("slot", slot)?;
                writes.insert(SlotId::new(slot));
            }
            let id = ImplId::new(&im.name);
            let entry = Implementation {
                id: id.clone(),
                facet: FacetId::new(&im.facet),
                reads,
                writes,
            };
            if implementations.insert(id, entry).is_some() {
                return Err(duplicate("implementation", &im.name));
            }
        }

        let mut bindings = BTreeMap::new();
        for (function, implementation) in &desc.bindings {
            ident("function", function)?;
            ident("implementation", implementation)?;
            bindings.insert(FunctionId::new(function), ImplId::new(implementation));
        }

        let mut requires = BTreeMap::new();
        for dep in &desc.depends_on {
            ident("package", &dep.name)?;
            let version = match &dep.version {
                Some(tag) => tag
                    .parse()
                    .map_err(|reason| ShapeError::BadVersion { reason })?,
                None => Version::FIRST,
            };
            if requires.insert(PackageId::new(&dep.name), version).is_some() {
                return Err(duplicate("dependency", &dep.name));
            }
        }

        let mut model = Self {
            name: PackageId::new(&desc.name),
            functions,
            events,
            interfaces,
            exports,
            declared_layout,
            declared_slot_type,
            implementations,
            bindings,
            requires,
            current,
            declared_in: BTreeMap::new(),
        };
        model.rebuild_member_index();
        Ok(model)
    }

    /// Recompute the function → declaring-interfaces index from the
    /// interface relation. Programmatic constructors call this after
    /// filling the fields by hand.
    pub fn rebuild_member_index(&mut self) {
        let mut declared_in: BTreeMap<FunctionId, BTreeSet<InterfaceId>> = BTreeMap::new();
        for (iid, iface) in &self.interfaces {
            for fid in &iface.functions {
                declared_in
                    .entry(fid.clone())
                    .or_default()
                    .insert(iid.clone());
            }
        }
        self.declared_in = declared_in;
    }

    /// `exportedFuncs(v)`: the union of the function sets of all declared
    /// interfaces exported at `v`, deduplicated.
    ///
    /// Derivation is purely structural: unknown interface ids contribute
    /// nothing here (the validator reports them), and interface kind is not
    /// consulted (exporting an internal interface is likewise a diagnostic,
    /// not a derivation change).
    pub fn exported_funcs_at(&self, version: Version) -> BTreeSet<FunctionId> {
        let mut out = BTreeSet::new();
        if let Some(exported) = self.exports.get(&version) {
            for iid in exported {
                if let Some(iface) = self.interfaces.get(iid) {
                    out.extend(iface.functions.iter().cloned());
                }
            }
        }
        out
    }

    /// The cumulative storage layout at `version`: every slot introduced at
    /// any version up to and including it.
    pub fn cumulative_layout_at(&self, version: Version) -> BTreeSet<SlotId> {
        let mut out = BTreeSet::new();
        for (v, slots) in &self.declared_layout {
            if *v <= version {
                out.extend(slots.iter().cloned());
            }
        }
        out
    }

    /// The declared type of `slot` as of `version`: its earliest
    /// declaration at or before that version.
    pub fn slot_type_at(&self, version: Version, slot: &SlotId) -> Option<BType> {
        for (v, types) in &self.declared_slot_type {
            if *v > version {
                break;
            }
            if let Some(ty) = types.get(slot) {
                return Some(*ty);
            }
        }
        None
    }
}

fn ident(role: &'static str, value: &str) -> Result<(), ShapeError> {
    if IDENT_RE.is_match(value) {
        Ok(())
    } else {
        Err(ShapeError::BadIdentifier {
            role,
            value: value.to_string(),
        })
    }
}

fn duplicate(role: &'static str, value: &str) -> ShapeError {
    ShapeError::DuplicateSymbol {
        role,
        value: value.to_string(),
    }
}
