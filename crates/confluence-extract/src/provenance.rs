//! Provenance: which graph node contributed each catalog member

use std::collections::BTreeMap;
use std::fmt;

use confluence_graph::NodeId;
use serde::{Deserialize, Serialize};

use crate::{Catalog, ExtractError, Result};

/// `interface -> member -> source node`
///
/// Recording is first-writer-wins per `(interface, member)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceMap {
    interfaces: BTreeMap<String, BTreeMap<String, NodeId>>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source` for `interface#api` unless already recorded
    ///
    /// Returns true when this call established the entry.
    pub fn record(&mut self, interface: &str, api: &str, source: NodeId) -> bool {
        let apis = self.interfaces.entry(interface.to_string()).or_default();
        if apis.contains_key(api) {
            return false;
        }
        apis.insert(api.to_string(), source);
        true
    }

    pub fn get(&self, interface: &str, api: &str) -> Option<NodeId> {
        self.interfaces.get(interface)?.get(api).copied()
    }

    pub fn interface(&self, interface: &str) -> Option<&BTreeMap<String, NodeId>> {
        self.interfaces.get(interface)
    }

    /// Copy every entry of `from` onto `to`; entries already on `to` win
    pub fn copy_interface(&mut self, from: &str, to: &str) {
        let Some(entries) = self.interfaces.get(from).cloned() else {
            return;
        };
        for (api, source) in entries {
            self.record(to, &api, source);
        }
    }

    pub fn remove_interface(&mut self, interface: &str) {
        self.interfaces.remove(interface);
    }

    pub fn remove_api(&mut self, interface: &str, api: &str) {
        if let Some(apis) = self.interfaces.get_mut(interface) {
            apis.remove(api);
        }
    }

    /// Drop every entry whose pair is not in `catalog`
    pub fn retain_catalog(&mut self, catalog: &Catalog) {
        self.interfaces.retain(|interface, apis| {
            apis.retain(|api, _| catalog.contains_api(interface, api));
            !apis.is_empty()
        });
    }

    /// Flatten into [`Api`] records, ascending by interface then member
    pub fn apis(&self) -> Vec<Api> {
        self.interfaces
            .iter()
            .flat_map(|(interface, apis)| {
                apis.iter()
                    .map(move |(api, source)| Api::new(interface, api, Some(*source)))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.interfaces.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One catalog member with optional provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Api {
    /// `"<interface>#<api>"`
    pub id: String,
    pub interface_name: String,
    pub api_name: String,
    pub source_object_graph_id: Option<NodeId>,
}

impl Api {
    pub fn new(interface: &str, api: &str, source: Option<NodeId>) -> Self {
        Self {
            id: format!("{}#{}", interface, api),
            interface_name: interface.to_string(),
            api_name: api.to_string(),
            source_object_graph_id: source,
        }
    }

    /// Split `"Interface#api"` into its two halves
    pub fn parse_id(id: &str) -> Result<(&str, &str)> {
        let mut parts = id.split('#');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(interface), Some(api), None) if !interface.is_empty() && !api.is_empty() => {
                Ok((interface, api))
            }
            _ => Err(ExtractError::InvalidApiId(id.to_string())),
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source_object_graph_id {
            Some(source) => write!(f, "{} (node {})", self.id, source),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_writer_wins() {
        let mut sources = SourceMap::new();
        assert!(sources.record("Node", "appendChild", NodeId(10)));
        assert!(!sources.record("Node", "appendChild", NodeId(99)));
        assert_eq!(sources.get("Node", "appendChild"), Some(NodeId(10)));
    }

    #[test]
    fn test_copy_keeps_target_entries() {
        let mut sources = SourceMap::new();
        sources.record("window", "alert", NodeId(1));
        sources.record("window", "open", NodeId(1));
        sources.record("Window", "open", NodeId(7));
        sources.copy_interface("window", "Window");

        assert_eq!(sources.get("Window", "alert"), Some(NodeId(1)));
        assert_eq!(sources.get("Window", "open"), Some(NodeId(7)));
        sources.copy_interface("missing", "Window");
        assert_eq!(sources.len(), 4);
    }

    #[test]
    fn test_retain_catalog() {
        let mut sources = SourceMap::new();
        sources.record("A", "x", NodeId(1));
        sources.record("A", "gone", NodeId(1));
        sources.record("B", "y", NodeId(2));
        let catalog: Catalog = vec![("A", vec!["x"])].into_iter().collect();
        sources.retain_catalog(&catalog);

        assert_eq!(sources.len(), 1);
        assert!(sources.interface("B").is_none());
        assert_eq!(sources.apis(), vec![Api::new("A", "x", Some(NodeId(1)))]);
    }

    #[test]
    fn test_parse_api_id() {
        assert_eq!(Api::parse_id("Node#appendChild").unwrap(), ("Node", "appendChild"));
        for bad in ["Node", "Node#a#b", "#a", "Node#"] {
            assert!(matches!(Api::parse_id(bad), Err(ExtractError::InvalidApiId(_))));
        }
    }

    #[test]
    fn test_api_display() {
        assert_eq!(Api::new("A", "x", Some(NodeId(3))).to_string(), "A#x (node 3)");
        assert_eq!(Api::new("A", "x", None).id, "A#x");
    }
}
