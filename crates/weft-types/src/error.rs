use thiserror::Error;

use crate::newtypes::{EdgeId, NodeId};

/// Errors produced by type construction and document checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid calendar date: {0}")]
    InvalidDate(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// An edge endpoint does not resolve to a node of the same document.
    #[error("dangling edge reference in document '{document}': edge {edge} references missing node {node}")]
    DanglingEdgeReference {
        document: String,
        edge: EdgeId,
        node: NodeId,
    },

    #[error("duplicate node id in document '{document}': {id}")]
    DuplicateNodeId { document: String, id: NodeId },

    #[error("duplicate edge id in document '{document}': {id}")]
    DuplicateEdgeId { document: String, id: EdgeId },
}

/// Convenience alias for type-level results.
pub type TypeResult<T> = Result<T, TypeError>;
