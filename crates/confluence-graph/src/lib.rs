//! confluence-graph: Object graph accessor
//!
//! An object graph is a captured snapshot of a browser's JavaScript global
//! environment, exposed as id-based queries:
//! - own property lookup and enumeration (reserved names wrapped as `+name+`)
//! - `[[Prototype]]` links
//! - primitive/terminal node detection and type names
//! - runtime function names and `toString` tags
//! - every dotted path from the global object reaching a node
//!
//! [`ObjectGraph`] is the query trait the extractor consumes;
//! [`SnapshotGraph`] is the JSON-backed implementation.
//!
//! # Example
//!
//! ```
//! use confluence_graph::{GraphBuilder, NodeId, ObjectGraph};
//!
//! let graph = GraphBuilder::new(1)
//!     .function(2, "Foo")
//!     .object(3)
//!     .property(1, "Foo", 2)
//!     .property(2, "prototype", 3)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(graph.lookup_path("Foo.prototype"), Some(NodeId(3)));
//! assert_eq!(graph.keys(NodeId(3)), vec!["Foo.prototype".to_string()]);
//! ```

mod accessor;
mod builder;
mod error;
mod node;
mod release;
mod snapshot;

pub use accessor::ObjectGraph;
pub use builder::GraphBuilder;
pub use error::{GraphError, Result};
pub use node::{is_marker, marker, unwrap_marker, NodeId, PropertyMeta};
pub use release::ReleaseInfo;
pub use snapshot::{RawSnapshot, SnapshotGraph};
