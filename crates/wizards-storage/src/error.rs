//! Storage error types.
//!
//! [`StorageError`] covers the failure modes of the entity boundary:
//! missing nodes on update, backend write/delete failures, and snapshot
//! (de)serialization problems.

use thiserror::Error;

use wizards_core::NodeId;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An update targeted a node that is not persisted.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// The backend failed to persist or remove a node.
    #[error("backend failure: {reason}")]
    Backend { reason: String },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot file I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
