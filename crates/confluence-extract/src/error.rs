//! Error types for catalog extraction

use confluence_graph::{GraphError, NodeId};
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that abort one extraction pass
///
/// Heuristic misses (unnamed constructors, instances whose chain never reaches
/// a known prototype) and directives naming absent interfaces are not errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("object graph error: {0}")]
    Graph(#[from] GraphError),

    /// E-EXTRACT-001
    #[error("malformed object graph: {0}")]
    MalformedGraph(String),

    /// E-EXTRACT-002
    #[error("prototype cycle detected: {chain}")]
    PrototypeCycle {
        /// The node reached twice
        node: NodeId,
        /// Full walk, e.g. "12 -> 40 -> 12"
        chain: String,
    },

    /// E-EXTRACT-003
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// E-EXTRACT-004
    #[error("invalid API name pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// E-EXTRACT-005
    #[error("post-processing pipeline is not idempotent: {0}")]
    NonIdempotentPipeline(String),

    /// E-EXTRACT-006
    #[error("invalid API identifier {0:?}, expected \"Interface#api\"")]
    InvalidApiId(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ExtractError {
    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            ExtractError::Graph(e) => e.code(),
            ExtractError::MalformedGraph(_) => "E-EXTRACT-001",
            ExtractError::PrototypeCycle { .. } => "E-EXTRACT-002",
            ExtractError::InvariantViolation(_) => "E-EXTRACT-003",
            ExtractError::InvalidPattern { .. } => "E-EXTRACT-004",
            ExtractError::NonIdempotentPipeline(_) => "E-EXTRACT-005",
            ExtractError::InvalidApiId(_) => "E-EXTRACT-006",
            ExtractError::Config(_) => "E-CONFIG",
            ExtractError::Io(_) => "E-IO",
        }
    }

    /// Whether the snapshot itself is at fault (skip it) rather than the
    /// configuration or the extractor
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExtractError::Graph(_) | ExtractError::MalformedGraph(_) | ExtractError::PrototypeCycle { .. }
        )
    }

    /// Whether internal bookkeeping went wrong; these are bugs, never data
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ExtractError::InvariantViolation(_))
    }
}
