//! The [`EntityStore`] trait defining the storage contract for tree nodes.
//!
//! The tree logic is written entirely against this trait. The API is
//! deliberately small: four CRUD primitives plus a root query. Each call
//! touches exactly one node, serving as the incremental save mechanism a
//! reconciliation pass needs -- there is no bulk "save the whole tree"
//! operation, because a save is a sequence of per-node decisions.
//!
//! The trait is synchronous (not async) for simplicity in the current
//! single-threaded, request-scoped design.

use wizards_core::{LanguageInfo, NodeId, TreeNode};

use crate::error::StorageError;

/// The storage contract for wizard tree nodes.
pub trait EntityStore {
    // -------------------------------------------------------------------
    // Node CRUD
    // -------------------------------------------------------------------

    /// Loads a node by ID.
    ///
    /// Returns `Ok(None)` when no such node is persisted; an `Err` is
    /// reserved for backend failures.
    fn load(&self, id: NodeId) -> Result<Option<TreeNode>, StorageError>;

    /// Persists a new node, assigning its real identity.
    ///
    /// The node's incoming `id` (typically a placeholder) is ignored; the
    /// assigned ID is returned.
    fn insert(&mut self, node: TreeNode) -> Result<NodeId, StorageError>;

    /// Overwrites an existing node.
    ///
    /// Returns [`StorageError::NodeNotFound`] when the node's ID is not
    /// persisted.
    fn update(&mut self, node: &TreeNode) -> Result<(), StorageError>;

    /// Removes a node.
    ///
    /// Deleting an absent ID is a no-op, so a crashed cascade can be
    /// recovered by re-running the same save request.
    fn delete(&mut self, id: NodeId) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Lists the published wizard roots, in ascending ID order.
    fn query_roots(&self) -> Result<Vec<NodeId>, StorageError>;
}

/// Source of the translation languages offered to editing clients.
pub trait LanguageCatalog {
    /// Lists every available language.
    fn available_languages(&self) -> Vec<LanguageInfo>;
}
