//! DOM Node Operations
//!
//! Errors raised by tree manipulation (appendChild, insertBefore, ...).

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Inserting a node into itself or one of its descendants
    #[error("hierarchy request error: {child} cannot be inserted into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Reference node is not a child of the target parent
    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    /// Operation requires an element
    #[error("{0} is not an element")]
    NotAnElement(NodeId),
}
