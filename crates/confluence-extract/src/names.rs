//! Interface naming heuristics
//!
//! Each heuristic is a pure function over the graph. [`NameResolver`] runs the
//! ones enabled by the configuration in a fixed order and merges their
//! results, earlier heuristics first, without duplicates.

use std::sync::LazyLock;

use confluence_graph::{is_marker, NodeId, ObjectGraph};
use regex::Regex;

use crate::members::append_new;
use crate::ExtractionConfig;

const PROTOTYPE_KEY: &str = "prototype";
const CONSTRUCTOR_MARKER: &str = "+constructor+";

static TO_STRING_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[object ([A-Za-z_$][0-9A-Za-z_$]*)\]$").expect("valid toString tag pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionNameHeuristic {
    GraphPaths,
    RuntimeName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassNameHeuristic {
    GraphPaths,
    ToStringTag,
}

/// Derives interface names for constructors and prototypes
pub struct NameResolver<'g> {
    graph: &'g dyn ObjectGraph,
    function_heuristics: Vec<FunctionNameHeuristic>,
    class_heuristics: Vec<ClassNameHeuristic>,
    use_constructor_property: bool,
}

impl<'g> NameResolver<'g> {
    pub fn new(graph: &'g dyn ObjectGraph, config: &ExtractionConfig) -> Self {
        let mut function_heuristics = Vec::new();
        if config.function_names_from_graph_paths {
            function_heuristics.push(FunctionNameHeuristic::GraphPaths);
        }
        function_heuristics.push(FunctionNameHeuristic::RuntimeName);

        let mut class_heuristics = Vec::new();
        if config.class_names_from_graph_paths {
            class_heuristics.push(ClassNameHeuristic::GraphPaths);
        }
        if config.class_names_from_to_string {
            class_heuristics.push(ClassNameHeuristic::ToStringTag);
        }

        Self {
            graph,
            function_heuristics,
            class_heuristics,
            use_constructor_property: config.class_names_from_constructor_property,
        }
    }

    /// Names of a function node: path-derived names, then the runtime name
    pub fn function_names(&self, id: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        for heuristic in &self.function_heuristics {
            let found = match heuristic {
                FunctionNameHeuristic::GraphPaths => names_from_function_paths(self.graph, id),
                FunctionNameHeuristic::RuntimeName => {
                    runtime_function_name(self.graph, id).into_iter().collect()
                }
            };
            append_new(&mut names, found);
        }
        names
    }

    /// Names of the class a prototype node belongs to
    ///
    /// A `constructor` property, when enabled and present, decides alone.
    pub fn class_names(&self, proto: NodeId) -> Vec<String> {
        if self.use_constructor_property {
            if let Some(ctor) = constructor_of(self.graph, proto) {
                return self.function_names(ctor);
            }
        }

        let mut names = Vec::new();
        for heuristic in &self.class_heuristics {
            let found = match heuristic {
                ClassNameHeuristic::GraphPaths => class_names_from_paths(self.graph, proto),
                ClassNameHeuristic::ToStringTag => {
                    class_name_from_to_string(self.graph, proto).into_iter().collect()
                }
            };
            append_new(&mut names, found);
        }
        names
    }
}

/// Last segments of the paths reaching `id`, skipping markers and `prototype`
pub fn names_from_function_paths(graph: &dyn ObjectGraph, id: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    for path in graph.keys(id) {
        let Some(last) = path.rsplit('.').next() else {
            continue;
        };
        if last.is_empty() || is_marker(last) || last == PROTOTYPE_KEY {
            continue;
        }
        if !names.iter().any(|n| n == last) {
            names.push(last.to_string());
        }
    }
    names
}

pub fn runtime_function_name(graph: &dyn ObjectGraph, id: NodeId) -> Option<String> {
    graph
        .function_name(id)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// `<Name>` out of every path shaped `...<Name>.prototype`
pub fn class_names_from_paths(graph: &dyn ObjectGraph, proto: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    for path in graph.keys(proto) {
        let mut segments = path.rsplit('.');
        if segments.next() != Some(PROTOTYPE_KEY) {
            continue;
        }
        let Some(name) = segments.next().filter(|name| !name.is_empty()) else {
            continue;
        };
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// `Foo` out of `[object Foo]`, `[object FooPrototype]` or `[object FooConstructor]`
pub fn class_name_from_to_string(graph: &dyn ObjectGraph, proto: NodeId) -> Option<String> {
    let tag = graph.to_string_tag(proto)?;
    let captures = TO_STRING_TAG_RE.captures(tag)?;
    let name = captures.get(1)?.as_str();
    let name = name
        .strip_suffix("Prototype")
        .or_else(|| name.strip_suffix("Constructor"))
        .unwrap_or(name);
    if name.is_empty() || name == "Object" {
        return None;
    }
    Some(name.to_string())
}

fn constructor_of(graph: &dyn ObjectGraph, proto: NodeId) -> Option<NodeId> {
    if graph.is_type(proto) {
        return None;
    }
    graph.lookup(CONSTRUCTOR_MARKER, proto)
}
