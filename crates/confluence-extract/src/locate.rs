//! Missing-API locator
//!
//! When a member expected on an interface is absent from the catalog, the
//! graph usually still holds it somewhere. [`locate_api`] ranks every node by
//! how closely one of its paths matches `Interface` and `api`.

use confluence_graph::{NodeId, ObjectGraph};
use regex::Regex;
use serde::Serialize;

use crate::{Api, Result};

/// A node whose paths matched, with its paths shortest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeHit {
    pub id: NodeId,
    pub paths: Vec<String>,
}

impl NodeHit {
    fn new(id: NodeId, mut paths: Vec<String>) -> Self {
        paths.sort_by_key(String::len);
        Self { id, paths }
    }
}

/// Candidate nodes in decreasing order of confidence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiLocation {
    /// A path ends in `Interface.api`
    pub likely: Vec<NodeHit>,
    /// A path mentions `Interface`, then `api`
    pub possible: Vec<NodeHit>,
    /// A path mentions `api`
    pub unlikely: Vec<NodeHit>,
}

impl ApiLocation {
    pub fn is_empty(&self) -> bool {
        self.likely.is_empty() && self.possible.is_empty() && self.unlikely.is_empty()
    }

    pub fn len(&self) -> usize {
        self.likely.len() + self.possible.len() + self.unlikely.len()
    }
}

/// Search the graph for `"Interface#api"`
///
/// Both halves are used as regular expressions, unescaped; a half that does
/// not compile matches nothing. Each node lands in the first tier it matches.
pub fn locate_api(graph: &dyn ObjectGraph, api_id: &str) -> Result<ApiLocation> {
    let (interface, api) = Api::parse_id(api_id)?;
    let tight = Regex::new(&format!(r"{}\.{}$", interface, api)).ok();
    let medium = Regex::new(&format!("{}.*{}", interface, api)).ok();
    let loose = Regex::new(api).ok();

    let matches = |pattern: &Option<Regex>, paths: &[String]| {
        pattern
            .as_ref()
            .is_some_and(|re| paths.iter().any(|path| re.is_match(path)))
    };

    let mut location = ApiLocation::default();
    for id in graph.all_ids() {
        let paths = graph.keys(id);
        if paths.is_empty() {
            continue;
        }
        let tier = if matches(&tight, &paths) {
            &mut location.likely
        } else if matches(&medium, &paths) {
            &mut location.possible
        } else if matches(&loose, &paths) {
            &mut location.unlikely
        } else {
            continue;
        };
        tier.push(NodeHit::new(id, paths));
    }
    Ok(location)
}
