//! Confluence - Web API catalogs from browser object graph snapshots
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use confluence_extract as extract;
pub use confluence_graph as graph;
