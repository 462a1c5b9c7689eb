//! API classification
//!
//! Three phases over every node of the graph, in ascending id order:
//!
//! 1. **Registration.** Function-like nodes (objects with an own `prototype`)
//!    become constructor records and index their prototype. Non-function
//!    globals become *libraries*: records that are their own prototype.
//! 2. **Own members.** Constructors and libraries take their own members
//!    minus `arguments`, `name`, `length` and `caller`. Registered prototypes
//!    attribute their members to their constructor and keep pulling up
//!    ancestors while those still belong to the same interface.
//! 3. **Instances.** Every other object walks its chain up to the first
//!    registered prototype and hands the members it found on the way to that
//!    prototype's constructor.
//!
//! Attribution is first-writer-wins per record, so later phases never
//! override earlier provenance.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use confluence_graph::{is_marker, NodeId, ObjectGraph};
use indexmap::IndexMap;
use tracing::debug;

use crate::chain::PrototypeChain;
use crate::members::{append_new, MemberFilter};
use crate::names::NameResolver;
use crate::{ExtractError, ExtractionConfig, Result};

const PROTOTYPE_KEY: &str = "prototype";

/// A constructor (or library) and the members attributed to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorRecord {
    pub id: NodeId,
    /// Interface names; empty when no heuristic matched
    pub names: Vec<String>,
    /// Member name -> contributing node, in attribution order
    pub members: IndexMap<String, NodeId>,
    /// A non-function global acting as its own prototype
    pub is_library: bool,
}

impl ConstructorRecord {
    fn new(id: NodeId, names: Vec<String>, is_library: bool) -> Self {
        Self {
            id,
            names,
            members: IndexMap::new(),
            is_library,
        }
    }

    /// Attribute `api` to this record unless it is already attributed
    pub fn attribute(&mut self, api: &str, source: NodeId) -> bool {
        if self.members.contains_key(api) {
            return false;
        }
        self.members.insert(api.to_string(), source);
        true
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

/// Classifies one graph; consumed by [`ApiClassifier::classify`]
pub struct ApiClassifier<'g> {
    graph: &'g dyn ObjectGraph,
    names: NameResolver<'g>,
    filter: MemberFilter<'g>,
    records: BTreeMap<NodeId, ConstructorRecord>,
    /// prototype -> owning constructor
    protos: HashMap<NodeId, NodeId>,
    class_member_cache: HashMap<NodeId, Rc<Vec<String>>>,
    inherited_cache: HashMap<NodeId, Rc<HashSet<String>>>,
}

impl<'g> ApiClassifier<'g> {
    pub fn new(graph: &'g dyn ObjectGraph, config: &ExtractionConfig) -> Self {
        Self {
            graph,
            names: NameResolver::new(graph, config),
            filter: MemberFilter::new(graph, config),
            records: BTreeMap::new(),
            protos: HashMap::new(),
            class_member_cache: HashMap::new(),
            inherited_cache: HashMap::new(),
        }
    }

    /// Run all phases; records come back in ascending id order
    pub fn classify(mut self) -> Result<Vec<ConstructorRecord>> {
        let ids = self.graph.all_ids();

        self.register_functions(&ids);
        self.register_libraries();
        debug!(
            constructors = self.records.len(),
            prototypes = self.protos.len(),
            "registered constructors"
        );

        for &id in &ids {
            self.attribute_own_members(id)?;
        }
        debug!(
            members = self.attributed_count(),
            "attributed constructor and prototype members"
        );

        for &id in &ids {
            self.attribute_instance(id)?;
        }
        debug!(
            members = self.attributed_count(),
            "attributed instance members"
        );

        Ok(self.records.into_values().collect())
    }

    fn attributed_count(&self) -> usize {
        self.records.values().map(|r| r.members.len()).sum()
    }

    fn is_function_like(&self, id: NodeId) -> bool {
        !self.graph.is_type(id) && self.graph.lookup(PROTOTYPE_KEY, id).is_some()
    }

    fn register_functions(&mut self, ids: &[NodeId]) {
        for &id in ids {
            if !self.is_function_like(id) {
                continue;
            }
            let proto = self
                .graph
                .lookup(PROTOTYPE_KEY, id)
                .filter(|&proto| !self.graph.is_type(proto));
            if let Some(proto) = proto {
                // Shared prototypes belong to the highest id constructor
                self.protos.insert(proto, id);
            }
            let names = self.names.function_names(id);
            self.records.insert(id, ConstructorRecord::new(id, names, false));
        }
    }

    fn register_libraries(&mut self) {
        let root = self.graph.root();
        for key in self.graph.object_keys(root) {
            if is_marker(&key) {
                continue;
            }
            let Some(id) = self.graph.lookup(&key, root) else {
                continue;
            };
            if self.graph.is_type(id) || self.is_function_like(id) {
                continue;
            }
            // A later alias (`self`, then `window`) replaces earlier names
            let mut names = self.names.class_names(id);
            append_new(&mut names, [key]);
            self.protos.insert(id, id);
            self.records.insert(id, ConstructorRecord::new(id, names, true));
        }
    }

    fn record_mut(&mut self, ctor: NodeId) -> Result<&mut ConstructorRecord> {
        self.records.get_mut(&ctor).ok_or_else(|| {
            ExtractError::InvariantViolation(format!("no constructor record for node {}", ctor))
        })
    }

    fn class_members(&mut self, id: NodeId) -> Rc<Vec<String>> {
        if let Some(members) = self.class_member_cache.get(&id) {
            return Rc::clone(members);
        }
        let members = Rc::new(self.filter.class_members(id));
        self.class_member_cache.insert(id, Rc::clone(&members));
        members
    }

    /// Class members of every strict ancestor of `id`
    fn inherited_members(&mut self, id: NodeId) -> Result<Rc<HashSet<String>>> {
        if let Some(members) = self.inherited_cache.get(&id) {
            return Ok(Rc::clone(members));
        }
        let mut inherited = HashSet::new();
        for ancestor in PrototypeChain::ancestors(self.graph, id) {
            let ancestor = ancestor?;
            inherited.extend(self.class_members(ancestor).iter().cloned());
        }
        let inherited = Rc::new(inherited);
        self.inherited_cache.insert(id, Rc::clone(&inherited));
        Ok(inherited)
    }

    fn attribute_own_members(&mut self, id: NodeId) -> Result<()> {
        if self.records.contains_key(&id) {
            let members = self.filter.constructor_members(id);
            let record = self.record_mut(id)?;
            for api in &members {
                record.attribute(api, id);
            }
            return Ok(());
        }
        if let Some(&ctor) = self.protos.get(&id) {
            self.pull_up(ctor, id)?;
        }
        Ok(())
    }

    /// Attribute `start` and the ancestors that still belong to `ctor`
    fn pull_up(&mut self, ctor: NodeId, start: NodeId) -> Result<()> {
        let ctor_names = self.names.function_names(ctor);
        for proto in PrototypeChain::starting_at(self.graph, start) {
            let proto = proto?;
            if !self.belongs_to(ctor, &ctor_names, proto) {
                break;
            }
            self.attribute_prototype(ctor, proto)?;
        }
        Ok(())
    }

    /// Whether `proto` is still part of `ctor`'s own interface
    ///
    /// True for prototypes owned by `ctor` or by no one, and for prototypes of
    /// other constructors whose class names overlap `ctor`'s names.
    fn belongs_to(&self, ctor: NodeId, ctor_names: &[String], proto: NodeId) -> bool {
        match self.protos.get(&proto) {
            None => true,
            Some(&owner) if owner == ctor => true,
            Some(_) => {
                let class_names = self.names.class_names(proto);
                ctor_names.iter().any(|name| class_names.contains(name))
            }
        }
    }

    fn attribute_prototype(&mut self, ctor: NodeId, proto: NodeId) -> Result<()> {
        self.check_on_constructor_chain(ctor, proto)?;

        let inherited = self.inherited_members(proto)?;
        let members = self.class_members(proto);
        let record = self.record_mut(ctor)?;
        for api in members.iter().filter(|api| !inherited.contains(*api)) {
            record.attribute(api, proto);
        }
        Ok(())
    }

    fn check_on_constructor_chain(&self, ctor: NodeId, proto: NodeId) -> Result<()> {
        let start = self.graph.lookup(PROTOTYPE_KEY, ctor).ok_or_else(|| {
            ExtractError::InvariantViolation(format!(
                "constructor {} owns prototype {} but has no prototype property",
                ctor, proto
            ))
        })?;
        for step in PrototypeChain::starting_at(self.graph, start) {
            if step? == proto {
                return Ok(());
            }
        }
        Err(ExtractError::InvariantViolation(format!(
            "prototype {} is not on the chain of constructor {}",
            proto, ctor
        )))
    }

    fn attribute_instance(&mut self, id: NodeId) -> Result<()> {
        if self.graph.is_type(id) || self.records.contains_key(&id) || self.protos.contains_key(&id)
        {
            return Ok(());
        }

        let mut found: IndexMap<String, NodeId> = IndexMap::new();
        let mut owner = None;
        for step in PrototypeChain::starting_at(self.graph, id) {
            let step = step?;
            if let Some(&ctor) = self.protos.get(&step) {
                owner = Some((ctor, step));
                break;
            }
            let inherited = self.inherited_members(step)?;
            for api in self.filter.instance_members(step) {
                if !inherited.contains(&api) && !found.contains_key(&api) {
                    found.insert(api, step);
                }
            }
        }

        let Some((ctor, proto)) = owner else {
            return Ok(());
        };
        // Chain roots (Object.prototype) never absorb instance members
        if found.is_empty() || self.graph.is_terminal(self.graph.prototype(proto)) {
            return Ok(());
        }
        let record = self.record_mut(ctor)?;
        for (api, source) in &found {
            record.attribute(api, *source);
        }
        Ok(())
    }
}
