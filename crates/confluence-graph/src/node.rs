//! Node identifiers and per-property metadata

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a node in an object graph snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

/// Property descriptor flags recorded by the capture tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMeta {
    #[serde(default = "default_true")]
    pub writable: bool,
    #[serde(default = "default_true")]
    pub enumerable: bool,
    #[serde(default = "default_true")]
    pub configurable: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PropertyMeta {
    fn default() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }
}

impl PropertyMeta {
    /// Descriptor of a read-only data property (`writable: false`)
    pub fn read_only() -> Self {
        Self {
            writable: false,
            ..Self::default()
        }
    }
}

/// Whether `name` is a reserved property marker of the form `+name+`
pub fn is_marker(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('+') && name.ends_with('+')
}

/// Strip the `+...+` marker wrapping, if present
pub fn unwrap_marker(name: &str) -> &str {
    if is_marker(name) {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

/// Wrap a property name in the reserved marker form
pub fn marker(name: &str) -> String {
    format!("+{}+", name)
}
