//! Structured outcome of a save operation.
//!
//! A save touches many nodes; [`SaveReport`] records what happened to each
//! of them -- IDs assigned to new nodes, updated and deleted nodes, and
//! per-node failures -- so a caller never has to guess whether a partial
//! write occurred.

use serde::{Deserialize, Serialize};

use wizards_core::NodeId;

/// The ID assignment performed for one newly created node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedId {
    /// The ID the edited tree used for the node (a placeholder, or a stale
    /// ID that no longer resolved).
    pub wire_id: NodeId,
    /// The real ID storage assigned.
    pub id: NodeId,
}

/// A failure isolated to a single node of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeError {
    /// The wire ID of the node whose save failed.
    pub id: NodeId,
    /// Human-readable failure description.
    pub reason: String,
}

/// Everything a save did, per node.
///
/// Tracks four categories: created (with their ID assignments), updated,
/// deleted, and failed nodes. A failure never aborts the rest of the
/// batch; it lands in `errors` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveReport {
    /// Newly persisted nodes and their assigned IDs.
    pub created: Vec<CreatedId>,
    /// Nodes that already existed and were overwritten.
    pub updated: Vec<NodeId>,
    /// Nodes removed by delete cascades.
    pub deleted: Vec<NodeId>,
    /// Per-node failures.
    pub errors: Vec<NodeError>,
}

impl SaveReport {
    /// Returns `true` when every node saved cleanly.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total count of nodes the save touched (created + updated + deleted).
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }

    /// Looks up the real ID assigned to a wire ID, if one was created.
    pub fn assigned(&self, wire_id: NodeId) -> Option<NodeId> {
        self.created
            .iter()
            .find(|c| c.wire_id == wire_id)
            .map(|c| c.id)
    }
}
