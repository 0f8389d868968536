//! Error types for the row model.

use crate::node::NodeKey;
use crate::value::ColumnId;

/// Result type alias for row model operations.
pub type GridResult<T> = std::result::Result<T, GridError>;

/// Errors that can occur while building or mutating a row tree.
///
/// Selection never fails through this type: a rejected selection attempt is
/// reported through `tracing` and a zero updated-count instead.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The node key is invalid or the node has been removed.
    #[error("Invalid or removed row node {0:?}")]
    InvalidNode(NodeKey),

    /// A child was attached to a node that is not a group.
    #[error("Row node {0:?} is not a group and cannot hold children")]
    NotAGroup(NodeKey),

    /// Attaching the child would make a node its own ancestor.
    #[error("Cannot attach row node {child:?} under its own descendant {parent:?}")]
    CircularParentage { parent: NodeKey, child: NodeKey },

    /// A child list referenced a node that is not a child of the parent.
    #[error("Row node {child:?} is not a child of {parent:?}")]
    DetachedNode { parent: NodeKey, child: NodeKey },

    /// The value service refused to store a value.
    #[error("Value for column '{column}' was rejected")]
    ValueRejected { column: ColumnId },

    /// Selection settings could not be parsed.
    #[error("Invalid selection settings: {0}")]
    Settings(#[from] toml::de::Error),
}
