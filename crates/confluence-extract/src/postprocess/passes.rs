//! The four post-processor kinds

use confluence_graph::{NodeId, ObjectGraph};
use regex::Regex;
use tracing::debug;

use crate::names::NameResolver;
use crate::postprocess::{PassResult, PostProcessContext, PostProcessor, Stage};
use crate::{Catalog, ExtractError, Result, SourceMap};

/// Copy an interface's members (and their provenance) into another interface
pub struct CopyToPrototype {
    from: String,
    to: Option<String>,
}

impl CopyToPrototype {
    pub fn new(from: impl Into<String>, to: Option<String>) -> Self {
        Self {
            from: from.into(),
            to,
        }
    }

    fn target(&self, ctx: &PostProcessContext<'_>) -> Option<String> {
        if let Some(to) = &self.to {
            return Some(to.clone());
        }
        let graph = ctx.graph?;
        let proto = inherited_prototype(graph, &self.from)?;
        NameResolver::new(graph, ctx.config)
            .class_names(proto)
            .into_iter()
            .next()
    }
}

/// The prototype whose interface should receive the members of global `name`
///
/// Constructors (`CSS2Properties`) hand over to the parent of their
/// `prototype` object; plain instances (`window`) to their own prototype.
fn inherited_prototype(graph: &dyn ObjectGraph, name: &str) -> Option<NodeId> {
    let global = graph.lookup(name, graph.root())?;
    if graph.is_type(global) {
        return None;
    }
    let proto = match graph.lookup("prototype", global) {
        Some(own_proto) if !graph.is_type(own_proto) => graph.prototype(own_proto),
        _ => graph.prototype(global),
    };
    proto.filter(|&id| !graph.is_type(id))
}

impl PostProcessor for CopyToPrototype {
    fn name(&self) -> &'static str {
        "copy-to-prototype"
    }

    fn stage(&self) -> Stage {
        Stage::Copy
    }

    fn copy_route(&self, ctx: &PostProcessContext<'_>) -> Option<(String, String)> {
        self.target(ctx).map(|target| (self.from.clone(), target))
    }

    fn run(
        &self,
        catalog: &mut Catalog,
        sources: &mut SourceMap,
        ctx: &PostProcessContext<'_>,
    ) -> PassResult {
        let Some(members) = catalog.get(&self.from).map(<[String]>::to_vec) else {
            return PassResult::default();
        };
        let Some(target) = self.target(ctx) else {
            debug!(from = %self.from, "no copy target resolved");
            return PassResult::default();
        };
        if target == self.from {
            return PassResult::default();
        }

        let added = catalog.add_members(&target, members);
        sources.copy_interface(&self.from, &target);
        debug!(from = %self.from, to = %target, added, "copied interface members");
        PassResult::changed(added)
    }
}

/// Delete whole interfaces
pub struct RemoveInterfaces {
    interfaces: Vec<String>,
}

impl RemoveInterfaces {
    pub fn new(interfaces: Vec<String>) -> Self {
        Self { interfaces }
    }
}

impl PostProcessor for RemoveInterfaces {
    fn name(&self) -> &'static str {
        "remove-interfaces"
    }

    fn stage(&self) -> Stage {
        Stage::Remove
    }

    fn run(
        &self,
        catalog: &mut Catalog,
        sources: &mut SourceMap,
        _ctx: &PostProcessContext<'_>,
    ) -> PassResult {
        let mut removed = 0;
        for interface in &self.interfaces {
            if let Some(members) = catalog.remove_interface(interface) {
                removed += members.len().max(1);
            }
            sources.remove_interface(interface);
        }
        PassResult::changed(removed)
    }
}

/// Delete members matching a pattern from selected interfaces
pub struct RemoveApis {
    interfaces: Vec<String>,
    pattern: Regex,
}

impl RemoveApis {
    pub fn new(interfaces: Vec<String>, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| ExtractError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            interfaces,
            pattern,
        })
    }
}

impl PostProcessor for RemoveApis {
    fn name(&self) -> &'static str {
        "remove-apis"
    }

    fn stage(&self) -> Stage {
        Stage::Remove
    }

    fn run(
        &self,
        catalog: &mut Catalog,
        sources: &mut SourceMap,
        _ctx: &PostProcessContext<'_>,
    ) -> PassResult {
        let mut removed = 0;
        for interface in &self.interfaces {
            let gone = catalog.retain_apis(interface, |api| !self.pattern.is_match(api));
            for api in &gone {
                sources.remove_api(interface, api);
            }
            removed += gone.len();
        }
        PassResult::changed(removed)
    }
}

/// Insert members the graph cannot show
pub struct AddApis {
    interface: String,
    apis: Vec<String>,
}

impl AddApis {
    pub fn new(interface: impl Into<String>, apis: Vec<String>) -> Self {
        Self {
            interface: interface.into(),
            apis,
        }
    }
}

impl PostProcessor for AddApis {
    fn name(&self) -> &'static str {
        "add-apis"
    }

    fn stage(&self) -> Stage {
        Stage::Add
    }

    fn run(
        &self,
        catalog: &mut Catalog,
        _sources: &mut SourceMap,
        _ctx: &PostProcessContext<'_>,
    ) -> PassResult {
        let added = catalog.add_members(&self.interface, self.apis.iter().cloned());
        PassResult::changed(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionConfig;
    use confluence_graph::GraphBuilder;

    fn catalog(entries: Vec<(&str, Vec<&str>)>) -> Catalog {
        entries.into_iter().collect()
    }

    #[test]
    fn test_remove_interfaces() {
        let config = ExtractionConfig::raw();
        let ctx = PostProcessContext::detached(&config);
        let mut cat = catalog(vec![("A", vec!["x"]), ("B", vec!["y"])]);
        let mut sources = SourceMap::new();
        sources.record("A", "x", NodeId(1));

        let result = RemoveInterfaces::new(vec!["A".into(), "Missing".into()]).run(
            &mut cat,
            &mut sources,
            &ctx,
        );
        assert!(result.modified);
        assert_eq!(cat, catalog(vec![("B", vec!["y"])]));
        assert!(sources.is_empty());
    }

    #[test]
    fn test_remove_apis_by_pattern() {
        let config = ExtractionConfig::raw();
        let ctx = PostProcessContext::detached(&config);
        let mut cat = catalog(vec![
            ("CSSStyleDeclaration", vec!["color", "background-color"]),
            ("Other", vec!["a-b"]),
        ]);
        let mut sources = SourceMap::new();
        sources.record("CSSStyleDeclaration", "background-color", NodeId(4));

        let pass = RemoveApis::new(vec!["CSSStyleDeclaration".into()], "-").unwrap();
        let result = pass.run(&mut cat, &mut sources, &ctx);
        assert_eq!(result.changes, 1);
        assert_eq!(cat.get("CSSStyleDeclaration").unwrap(), ["color"]);
        assert_eq!(cat.get("Other").unwrap(), ["a-b"]);
        assert!(sources.is_empty());
    }

    #[test]
    fn test_remove_apis_rejects_bad_pattern() {
        let err = RemoveApis::new(vec![], "(").err().unwrap();
        assert_eq!(err.code(), "E-EXTRACT-004");
    }

    #[test]
    fn test_copy_explicit_target() {
        let config = ExtractionConfig::raw();
        let ctx = PostProcessContext::detached(&config);
        let mut cat = catalog(vec![("window", vec!["a", "b"]), ("Window", vec!["b", "c"])]);
        let mut sources = SourceMap::new();
        sources.record("window", "a", NodeId(1));

        let pass = CopyToPrototype::new("window", Some("Window".into()));
        assert_eq!(pass.run(&mut cat, &mut sources, &ctx).changes, 1);
        assert_eq!(cat.get("Window").unwrap(), ["b", "c", "a"]);
        assert_eq!(sources.get("Window", "a"), Some(NodeId(1)));
    }

    #[test]
    fn test_copy_missing_source_is_noop() {
        let config = ExtractionConfig::raw();
        let ctx = PostProcessContext::detached(&config);
        let mut cat = catalog(vec![("Window", vec!["x"])]);
        let mut sources = SourceMap::new();
        let result =
            CopyToPrototype::new("window", Some("Window".into())).run(&mut cat, &mut sources, &ctx);
        assert!(!result.modified);
    }

    #[test]
    fn test_copy_resolves_target_from_graph() {
        // window (1) -> Window.prototype (3); CSS2Properties.prototype (6) -> CSSStyleDeclaration.prototype (5)
        let graph = GraphBuilder::new(1)
            .function(2, "Window")
            .object(3)
            .function(4, "CSSStyleDeclaration")
            .object(5)
            .function(7, "CSS2Properties")
            .object(6)
            .primitive(9, "null")
            .property(1, "window", 1)
            .property(1, "Window", 2)
            .property(1, "CSSStyleDeclaration", 4)
            .property(1, "CSS2Properties", 7)
            .property(2, "prototype", 3)
            .property(4, "prototype", 5)
            .property(7, "prototype", 6)
            .reserved(3, "constructor", 2)
            .reserved(5, "constructor", 4)
            .reserved(6, "constructor", 7)
            .prototype(1, 3)
            .prototype(3, 9)
            .prototype(5, 9)
            .prototype(6, 5)
            .build()
            .unwrap();
        let config = ExtractionConfig::raw();
        let ctx = PostProcessContext::new(&graph, &config);

        let mut cat = catalog(vec![("window", vec!["alert"]), ("CSS2Properties", vec!["cssFloat"])]);
        let mut sources = SourceMap::new();
        CopyToPrototype::new("window", None).run(&mut cat, &mut sources, &ctx);
        CopyToPrototype::new("CSS2Properties", None).run(&mut cat, &mut sources, &ctx);

        assert_eq!(cat.get("Window").unwrap(), ["alert"]);
        assert_eq!(cat.get("CSSStyleDeclaration").unwrap(), ["cssFloat"]);
    }

    #[test]
    fn test_copy_without_graph_or_target_is_noop() {
        let config = ExtractionConfig::raw();
        let ctx = PostProcessContext::detached(&config);
        let mut cat = catalog(vec![("window", vec!["alert"])]);
        let before = cat.clone();
        CopyToPrototype::new("window", None).run(&mut cat, &mut SourceMap::new(), &ctx);
        assert_eq!(cat, before);
    }

    #[test]
    fn test_add_apis() {
        let config = ExtractionConfig::raw();
        let ctx = PostProcessContext::detached(&config);
        let mut cat = Catalog::new();
        let mut sources = SourceMap::new();
        let pass = AddApis::new("Object", vec!["toString".into(), "valueOf".into()]);
        assert_eq!(pass.run(&mut cat, &mut sources, &ctx).changes, 2);
        assert_eq!(pass.run(&mut cat, &mut sources, &ctx).changes, 0);
        assert!(sources.is_empty());
    }
}
