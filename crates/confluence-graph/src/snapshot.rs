//! JSON-backed object graph snapshots
//!
//! A snapshot is the serialized heap of one browser's global environment.
//! Loading validates every cross reference up front and precomputes the
//! graph paths reaching each node, so queries afterwards are infallible.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GraphError, NodeId, ObjectGraph, PropertyMeta, Result};

/// The on-disk representation of a snapshot
///
/// Map keys are decimal node ids; see [`SnapshotGraph`] for the validated form.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub root: u32,
    #[serde(default)]
    pub data: IndexMap<String, IndexMap<String, u32>>,
    #[serde(default)]
    pub protos: IndexMap<String, u32>,
    #[serde(default)]
    pub types: IndexMap<String, String>,
    #[serde(default)]
    pub functions: IndexMap<String, String>,
    #[serde(default)]
    pub to_strings: IndexMap<String, String>,
    #[serde(default)]
    pub metadata: IndexMap<String, IndexMap<String, PropertyMeta>>,
}

/// A validated, query-ready object graph
#[derive(Debug, Clone)]
pub struct SnapshotGraph {
    root: NodeId,
    objects: HashMap<NodeId, IndexMap<String, NodeId>>,
    protos: HashMap<NodeId, NodeId>,
    types: HashMap<NodeId, String>,
    functions: HashMap<NodeId, String>,
    to_strings: HashMap<NodeId, String>,
    metadata: HashMap<NodeId, HashMap<String, PropertyMeta>>,
    ids: Vec<NodeId>,
    paths: HashMap<NodeId, Vec<String>>,
}

impl SnapshotGraph {
    /// Parse and validate a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Parse and validate a snapshot from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    /// Load a snapshot file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Validate a raw snapshot and build the path index
    pub fn from_raw(raw: RawSnapshot) -> Result<Self> {
        let mut objects = HashMap::with_capacity(raw.data.len());
        for (id, props) in raw.data {
            let id = parse_id(&id, "data")?;
            let props = props
                .into_iter()
                .map(|(key, target)| (key, NodeId(target)))
                .collect::<IndexMap<_, _>>();
            objects.insert(id, props);
        }

        let mut types = HashMap::with_capacity(raw.types.len());
        for (id, type_name) in raw.types {
            let id = parse_id(&id, "types")?;
            if objects.contains_key(&id) {
                return Err(GraphError::ConflictingNode(id.0));
            }
            types.insert(id, type_name);
        }

        let root = NodeId(raw.root);
        if !objects.contains_key(&root) {
            return Err(GraphError::MissingRoot(raw.root));
        }

        let known = |id: &NodeId| objects.contains_key(id) || types.contains_key(id);

        for (owner, props) in &objects {
            for (key, target) in props {
                if !known(target) {
                    return Err(GraphError::DanglingReference {
                        from: owner.0,
                        to: target.0,
                        via: key.clone(),
                    });
                }
            }
        }

        let mut protos = HashMap::with_capacity(raw.protos.len());
        for (id, proto) in raw.protos {
            let id = parse_id(&id, "protos")?;
            let proto = NodeId(proto);
            if !known(&id) || !known(&proto) {
                return Err(GraphError::DanglingReference {
                    from: id.0,
                    to: proto.0,
                    via: "[[Prototype]]".to_string(),
                });
            }
            protos.insert(id, proto);
        }

        let functions = parse_string_section(raw.functions, "functions")?;
        let to_strings = parse_string_section(raw.to_strings, "toStrings")?;

        let mut metadata = HashMap::with_capacity(raw.metadata.len());
        for (id, props) in raw.metadata {
            let id = parse_id(&id, "metadata")?;
            metadata.insert(id, props.into_iter().collect::<HashMap<_, _>>());
        }

        let mut ids: Vec<NodeId> = objects.keys().chain(types.keys()).copied().collect();
        ids.sort_unstable();

        let paths = index_paths(root, &objects);

        debug!(
            nodes = ids.len(),
            objects = objects.len(),
            primitives = types.len(),
            "loaded object graph snapshot"
        );

        Ok(Self {
            root,
            objects,
            protos,
            types,
            functions,
            to_strings,
            metadata,
            ids,
            paths,
        })
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the snapshot has no nodes (never true for a validated snapshot)
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of object (non-primitive) nodes
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of primitive/terminal nodes
    pub fn primitive_count(&self) -> usize {
        self.types.len()
    }

    /// Number of nodes with a runtime function name
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl ObjectGraph for SnapshotGraph {
    fn root(&self) -> NodeId {
        self.root
    }

    fn all_ids(&self) -> Vec<NodeId> {
        self.ids.clone()
    }

    fn lookup(&self, key: &str, from: NodeId) -> Option<NodeId> {
        self.objects.get(&from)?.get(key).copied()
    }

    fn object_keys(&self, id: NodeId) -> Vec<String> {
        self.objects
            .get(&id)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn keys(&self, id: NodeId) -> Vec<String> {
        self.paths.get(&id).cloned().unwrap_or_default()
    }

    fn prototype(&self, id: NodeId) -> Option<NodeId> {
        self.protos.get(&id).copied()
    }

    fn is_type(&self, id: NodeId) -> bool {
        !self.objects.contains_key(&id)
    }

    fn type_name(&self, id: NodeId) -> Option<&str> {
        self.types.get(&id).map(String::as_str)
    }

    fn function_name(&self, id: NodeId) -> Option<&str> {
        self.functions.get(&id).map(String::as_str)
    }

    fn to_string_tag(&self, id: NodeId) -> Option<&str> {
        self.to_strings.get(&id).map(String::as_str)
    }

    fn metadata(&self, key: &str, id: NodeId) -> Option<PropertyMeta> {
        self.metadata.get(&id)?.get(key).copied()
    }
}

fn parse_id(id: &str, section: &'static str) -> Result<NodeId> {
    id.parse::<u32>()
        .map(NodeId)
        .map_err(|_| GraphError::InvalidId {
            id: id.to_string(),
            section,
        })
}

fn parse_string_section(
    section: IndexMap<String, String>,
    name: &'static str,
) -> Result<HashMap<NodeId, String>> {
    section
        .into_iter()
        .map(|(id, value)| parse_id(&id, name).map(|id| (id, value)))
        .collect()
}

/// Breadth-first walk from the root recording one path per incoming edge
///
/// Each edge extends its parent's first (shortest) path, so the number of
/// recorded paths is bounded by the number of edges.
fn index_paths(
    root: NodeId,
    objects: &HashMap<NodeId, IndexMap<String, NodeId>>,
) -> HashMap<NodeId, Vec<String>> {
    let mut paths: HashMap<NodeId, Vec<String>> = HashMap::new();
    let mut first_path: HashMap<NodeId, String> = HashMap::new();
    let mut seen: HashSet<NodeId> = HashSet::from([root]);
    let mut queue: VecDeque<NodeId> = VecDeque::from([root]);

    while let Some(parent) = queue.pop_front() {
        let Some(props) = objects.get(&parent) else {
            continue;
        };
        let prefix = first_path.get(&parent).cloned();
        for (key, &child) in props {
            let path = match &prefix {
                Some(prefix) => format!("{}.{}", prefix, key),
                None => key.clone(),
            };
            paths.entry(child).or_default().push(path.clone());
            if seen.insert(child) {
                first_path.insert(child, path);
                queue.push_back(child);
            }
        }
    }

    paths
}
