//! The query surface over a captured object graph

use crate::{NodeId, PropertyMeta};

/// Read-only queries over one object graph snapshot
///
/// Implementations own the snapshot; consumers only ever hold node ids.
/// The trait is object safe so extraction code can work with
/// `&dyn ObjectGraph` regardless of how the snapshot was loaded.
pub trait ObjectGraph: Send + Sync {
    /// The global object the snapshot was captured from
    fn root(&self) -> NodeId;

    /// Every node id in the snapshot, ascending
    fn all_ids(&self) -> Vec<NodeId>;

    /// Follow the own property `key` of `from`
    fn lookup(&self, key: &str, from: NodeId) -> Option<NodeId>;

    /// Own property names of `id`, in capture order
    ///
    /// Reserved names are reported wrapped as `+name+`.
    fn object_keys(&self, id: NodeId) -> Vec<String>;

    /// Every dotted path from the root that reaches `id`
    fn keys(&self, id: NodeId) -> Vec<String>;

    /// The `[[Prototype]]` of `id`, if captured
    fn prototype(&self, id: NodeId) -> Option<NodeId>;

    /// Whether `id` is a primitive/terminal node rather than an object
    fn is_type(&self, id: NodeId) -> bool;

    /// Primitive type name of a terminal node (`"number"`, `"null"`, ...)
    fn type_name(&self, id: NodeId) -> Option<&str>;

    /// Runtime-reported function name
    fn function_name(&self, id: NodeId) -> Option<&str>;

    /// Result of `Object.prototype.toString` captured for `id`
    fn to_string_tag(&self, id: NodeId) -> Option<&str>;

    /// Descriptor flags of the own property `key` of `id`
    fn metadata(&self, key: &str, id: NodeId) -> Option<PropertyMeta>;

    /// Resolve a dotted path such as `Object.prototype` from the root
    fn lookup_path(&self, path: &str) -> Option<NodeId> {
        path.split('.')
            .try_fold(self.root(), |id, segment| self.lookup(segment, id))
    }

    /// Whether `id` is absent or terminal; chain walks stop here
    fn is_terminal(&self, id: Option<NodeId>) -> bool {
        id.map_or(true, |id| self.is_type(id))
    }
}
