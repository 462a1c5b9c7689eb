//! Error types for loading object graph snapshots

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// E-GRAPH-001
    #[error("invalid node id {id:?} in {section}")]
    InvalidId { id: String, section: &'static str },

    /// E-GRAPH-002
    #[error("root node {0} is missing or is not an object")]
    MissingRoot(u32),

    /// E-GRAPH-003
    #[error("node {from} references unknown node {to} via {via}")]
    DanglingReference { from: u32, to: u32, via: String },

    /// E-GRAPH-004
    #[error("node {0} is declared both as an object and as a primitive")]
    ConflictingNode(u32),

    /// E-GRAPH-005
    #[error("invalid snapshot file name: {0}")]
    InvalidFileName(String),
}

impl GraphError {
    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::Io(_) => "E-GRAPH-IO",
            GraphError::Json(_) => "E-GRAPH-JSON",
            GraphError::InvalidId { .. } => "E-GRAPH-001",
            GraphError::MissingRoot(_) => "E-GRAPH-002",
            GraphError::DanglingReference { .. } => "E-GRAPH-003",
            GraphError::ConflictingNode(_) => "E-GRAPH-004",
            GraphError::InvalidFileName(_) => "E-GRAPH-005",
        }
    }
}
