//! DOM Node Operations
//!
//! Error type shared by tree mutation and element operations.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found (never created or already released)
    #[error("Node {0} not found")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("Hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Operation requires a different node kind
    #[error("Invalid node type for {0}")]
    InvalidNodeType(NodeId),
    /// Node is not a child of the given parent
    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
