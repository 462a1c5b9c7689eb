//! Member (API name) enumeration and filtering

use confluence_graph::{is_marker, unwrap_marker, NodeId, ObjectGraph};

use crate::ExtractionConfig;

/// Constructor properties that belong to the universal Function interface
const FUNCTION_OWN_MEMBERS: [&str; 4] = ["arguments", "name", "length", "caller"];

const PROTOTYPE_KEY: &str = "prototype";

/// Append the names of `extra` missing from `names`, keeping order
pub(crate) fn append_new<I>(names: &mut Vec<String>, extra: I)
where
    I: IntoIterator<Item = String>,
{
    for name in extra {
        if !names.contains(&name) {
            names.push(name);
        }
    }
}

fn is_numeric(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Decides which own keys of a node count as interface members
///
/// `Object.prototype` and `Function.prototype` are located once, through the
/// graph paths of the same names, and filtered specially:
/// - `Object.prototype`: reserved `+name+` keys are unwrapped and kept
/// - `Function.prototype`: reserved keys are dropped, everything else is kept
///   (including `prototype`, numeric keys and constants)
pub struct MemberFilter<'g> {
    graph: &'g dyn ObjectGraph,
    object_prototype: Option<NodeId>,
    function_prototype: Option<NodeId>,
    retain_constants: bool,
    constant_types: Vec<&'static str>,
}

impl<'g> MemberFilter<'g> {
    pub fn new(graph: &'g dyn ObjectGraph, config: &ExtractionConfig) -> Self {
        Self {
            graph,
            object_prototype: graph.lookup_path("Object.prototype"),
            function_prototype: graph.lookup_path("Function.prototype"),
            retain_constants: config.retain_constant_members,
            constant_types: config.constant_types.iter().map(|t| t.as_str()).collect(),
        }
    }

    pub fn object_prototype(&self) -> Option<NodeId> {
        self.object_prototype
    }

    pub fn function_prototype(&self) -> Option<NodeId> {
        self.function_prototype
    }

    /// Members `id` defines as a class or prototype
    pub fn class_members(&self, id: NodeId) -> Vec<String> {
        let keys = self.graph.object_keys(id);
        let mut members = Vec::with_capacity(keys.len());

        if Some(id) == self.object_prototype {
            let kept = keys
                .iter()
                .filter(|key| key.as_str() != PROTOTYPE_KEY && !self.is_constant(id, key))
                .map(|key| unwrap_marker(key).to_string());
            append_new(&mut members, kept);
        } else if Some(id) == self.function_prototype {
            append_new(&mut members, keys.into_iter().filter(|key| !is_marker(key)));
        } else {
            let kept = keys.into_iter().filter(|key| {
                !is_marker(key)
                    && !is_numeric(key)
                    && key != PROTOTYPE_KEY
                    && !self.is_constant(id, key)
            });
            append_new(&mut members, kept);
        }
        members
    }

    /// Members a constructor (or library) defines on itself
    pub fn constructor_members(&self, id: NodeId) -> Vec<String> {
        self.class_members(id)
            .into_iter()
            .filter(|name| !FUNCTION_OWN_MEMBERS.contains(&name.as_str()))
            .collect()
    }

    /// Own keys of an instance that may be members of its interface
    pub fn instance_members(&self, id: NodeId) -> Vec<String> {
        self.graph
            .object_keys(id)
            .into_iter()
            .filter(|key| !is_marker(key) && !is_numeric(key))
            .collect()
    }

    /// Whether `owner.key` holds a read-only primitive of a constant type
    ///
    /// Always false when constants are retained.
    pub fn is_constant(&self, owner: NodeId, key: &str) -> bool {
        if self.retain_constants {
            return false;
        }
        let Some(value) = self.graph.lookup(key, owner) else {
            return false;
        };
        let constant_type = self
            .graph
            .type_name(value)
            .is_some_and(|t| self.constant_types.iter().any(|c| *c == t));
        constant_type
            && self
                .graph
                .metadata(key, owner)
                .is_some_and(|meta| !meta.writable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confluence_graph::{GraphBuilder, PropertyMeta, SnapshotGraph};

    /// Object (2) / Object.prototype (3), Function (4) / Function.prototype (5),
    /// and a plain prototype (6) reached as Foo.prototype
    fn filter_graph() -> SnapshotGraph {
        GraphBuilder::new(1)
            .function(2, "Object")
            .object(3)
            .function(4, "Function")
            .object(5)
            .function(7, "Foo")
            .object(6)
            .function(8, "method")
            .primitive(20, "number")
            .primitive(21, "string")
            .primitive(22, "undefined")
            .property(1, "Object", 2)
            .property(1, "Function", 4)
            .property(1, "Foo", 7)
            .property(2, "prototype", 3)
            .property(4, "prototype", 5)
            .property(7, "prototype", 6)
            .property(7, "name", 21)
            .property(7, "length", 20)
            .property(7, "create", 8)
            .reserved(3, "toString", 8)
            .property(3, "hasOwnProperty", 8)
            .property_with_meta(3, "LIMIT", 20, PropertyMeta::read_only())
            .reserved(5, "call", 8)
            .property(5, "apply", 8)
            .property(5, "0", 20)
            .property_with_meta(5, "MAX", 20, PropertyMeta::read_only())
            .reserved(6, "constructor", 7)
            .property(6, "run", 8)
            .property(6, "1", 20)
            .property_with_meta(6, "ELEMENT_NODE", 20, PropertyMeta::read_only())
            .property_with_meta(6, "label", 21, PropertyMeta::default())
            .property_with_meta(6, "nothing", 22, PropertyMeta::read_only())
            .build()
            .unwrap()
    }

    #[test]
    fn test_object_prototype_unwraps_markers() {
        let graph = filter_graph();
        let filter = MemberFilter::new(&graph, &ExtractionConfig::default());
        assert_eq!(filter.object_prototype(), Some(NodeId(3)));
        assert_eq!(filter.class_members(NodeId(3)), vec!["toString", "hasOwnProperty"]);
    }

    #[test]
    fn test_function_prototype_drops_markers_keeps_rest() {
        let graph = filter_graph();
        let filter = MemberFilter::new(&graph, &ExtractionConfig::default());
        assert_eq!(filter.function_prototype(), Some(NodeId(5)));
        assert_eq!(filter.class_members(NodeId(5)), vec!["apply", "0", "MAX"]);
    }

    #[test]
    fn test_default_filter() {
        let graph = filter_graph();
        let filter = MemberFilter::new(&graph, &ExtractionConfig::default());
        // writable strings and non-constant types survive
        assert_eq!(filter.class_members(NodeId(6)), vec!["run", "label", "nothing"]);
    }

    #[test]
    fn test_constants_retained_when_configured() {
        let graph = filter_graph();
        let config = ExtractionConfig {
            retain_constant_members: true,
            ..ExtractionConfig::default()
        };
        let filter = MemberFilter::new(&graph, &config);
        assert_eq!(
            filter.class_members(NodeId(6)),
            vec!["run", "ELEMENT_NODE", "label", "nothing"]
        );
    }

    #[test]
    fn test_constructor_deny_list() {
        let graph = filter_graph();
        let filter = MemberFilter::new(&graph, &ExtractionConfig::default());
        assert_eq!(filter.constructor_members(NodeId(7)), vec!["create"]);
    }

    #[test]
    fn test_instance_members_keep_prototype_and_constants() {
        let graph = filter_graph();
        let filter = MemberFilter::new(&graph, &ExtractionConfig::default());
        assert_eq!(
            filter.instance_members(NodeId(6)),
            vec!["run", "ELEMENT_NODE", "label", "nothing"]
        );
        assert_eq!(
            filter.instance_members(NodeId(7)),
            vec!["prototype", "name", "length", "create"]
        );
    }

    #[test]
    fn test_numeric_keys() {
        assert!(is_numeric("0"));
        assert!(is_numeric("42"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("4a"));
        assert!(!is_numeric("-1"));
    }
}
