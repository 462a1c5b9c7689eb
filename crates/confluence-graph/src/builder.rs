//! Programmatic snapshot construction
//!
//! Used by tests and by tools that synthesize graphs without going through
//! the JSON capture format. The result goes through the same validation as a
//! loaded snapshot.

use crate::{marker, PropertyMeta, RawSnapshot, Result, SnapshotGraph};

/// Incrementally builds a [`SnapshotGraph`]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    raw: RawSnapshot,
}

impl GraphBuilder {
    /// Start a graph whose global object is `root`
    pub fn new(root: u32) -> Self {
        let mut builder = Self::default();
        builder.raw.root = root;
        builder.object(root)
    }

    /// Declare an object node (idempotent)
    pub fn object(mut self, id: u32) -> Self {
        self.raw.data.entry(id.to_string()).or_default();
        self
    }

    /// Declare a function object node with a runtime name
    pub fn function(mut self, id: u32, name: &str) -> Self {
        self.raw.functions.insert(id.to_string(), name.to_string());
        self.object(id)
    }

    /// Declare a primitive/terminal node
    pub fn primitive(mut self, id: u32, type_name: &str) -> Self {
        self.raw.types.insert(id.to_string(), type_name.to_string());
        self
    }

    /// Add the own property `owner.key -> target`
    pub fn property(mut self, owner: u32, key: &str, target: u32) -> Self {
        self.raw
            .data
            .entry(owner.to_string())
            .or_default()
            .insert(key.to_string(), target);
        self
    }

    /// Add a property under the reserved `+key+` marker form
    pub fn reserved(self, owner: u32, key: &str, target: u32) -> Self {
        self.property(owner, &marker(key), target)
    }

    /// Add a property together with its descriptor flags
    pub fn property_with_meta(
        mut self,
        owner: u32,
        key: &str,
        target: u32,
        meta: PropertyMeta,
    ) -> Self {
        self.raw
            .metadata
            .entry(owner.to_string())
            .or_default()
            .insert(key.to_string(), meta);
        self.property(owner, key, target)
    }

    /// Set the `[[Prototype]]` of `id`
    pub fn prototype(mut self, id: u32, proto: u32) -> Self {
        self.raw.protos.insert(id.to_string(), proto);
        self
    }

    /// Record the `toString` tag captured for `id`
    pub fn to_string_tag(mut self, id: u32, tag: &str) -> Self {
        self.raw.to_strings.insert(id.to_string(), tag.to_string());
        self
    }

    /// The raw form, e.g. for writing fixtures to disk
    pub fn raw(&self) -> &RawSnapshot {
        &self.raw
    }

    /// Validate and index the graph
    pub fn build(self) -> Result<SnapshotGraph> {
        SnapshotGraph::from_raw(self.raw)
    }
}

impl From<GraphBuilder> for RawSnapshot {
    fn from(builder: GraphBuilder) -> Self {
        builder.raw
    }
}
