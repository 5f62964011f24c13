//! Read-only tree materialization.
//!
//! [`TreeReader`] walks the persisted graph from one or all roots and
//! produces the two wire shapes:
//!
//! - **Nested** builds are depth-first. A path-scoped visited stack guards
//!   against cycles: a child already on the current root-to-node path is
//!   silently omitted, so a malformed graph terminates instead of
//!   recursing forever.
//! - **Flattened** builds are breadth-first over a work queue. Every node
//!   is emitted exactly once no matter how many paths reach it, and its
//!   `parentStepId` is whichever parent was reached first -- the canonical
//!   de-duplication and cycle-breaking strategy.
//!
//! Absent or dangling references degrade to empty results; only backend
//! failures surface as errors.

use std::collections::VecDeque;

use indexmap::IndexMap;

use wizards_core::{FlattenedTree, NodeId, TreeNode, WireChild, WireNode};
use wizards_storage::{EntityStore, LanguageCatalog, StorageError};

/// Builds wire representations of persisted wizard trees.
pub struct TreeReader<'a, S, L> {
    store: &'a S,
    languages: &'a L,
}

impl<'a, S: EntityStore, L: LanguageCatalog> TreeReader<'a, S, L> {
    /// Creates a reader over the given backends.
    pub fn new(store: &'a S, languages: &'a L) -> Self {
        TreeReader { store, languages }
    }

    // -------------------------------------------------------------------
    // Nested builds
    // -------------------------------------------------------------------

    /// Builds the nested tree of every published wizard root.
    pub fn build_nested_all(&self) -> Result<IndexMap<NodeId, WireNode>, StorageError> {
        let mut trees = IndexMap::new();
        for root in self.store.query_roots()? {
            if let Some(node) = self.store.load(root)? {
                let mut path = Vec::new();
                trees.insert(root, self.build_step(&node, &mut path)?);
            }
        }
        Ok(trees)
    }

    /// Builds the nested tree rooted at `id`.
    ///
    /// Returns `Ok(None)` when no such node is persisted.
    pub fn build_nested_from(&self, id: NodeId) -> Result<Option<WireNode>, StorageError> {
        match self.store.load(id)? {
            Some(node) => {
                let mut path = Vec::new();
                Ok(Some(self.build_step(&node, &mut path)?))
            }
            None => Ok(None),
        }
    }

    /// Depth-first build of one subtree. `path` holds the IDs between the
    /// root and this node; a child already on it would close a cycle and
    /// is omitted.
    fn build_step(
        &self,
        node: &TreeNode,
        path: &mut Vec<NodeId>,
    ) -> Result<WireNode, StorageError> {
        path.push(node.id);
        let mut wire = WireNode::from_node(node);
        for &child_id in &node.children {
            if path.contains(&child_id) {
                continue;
            }
            let Some(child) = self.store.load(child_id)? else {
                continue;
            };
            let step = self.build_step(&child, path)?;
            wire.children.push(WireChild::Node(step));
        }
        path.pop();
        Ok(wire)
    }

    // -------------------------------------------------------------------
    // Flattened builds
    // -------------------------------------------------------------------

    /// Builds the flattened tree of every published wizard root.
    pub fn build_flattened_all(&self) -> Result<IndexMap<NodeId, FlattenedTree>, StorageError> {
        let mut trees = IndexMap::new();
        for root in self.store.query_roots()? {
            if let Some(node) = self.store.load(root)? {
                trees.insert(root, self.flatten(&node)?);
            }
        }
        Ok(trees)
    }

    /// Builds the flattened tree rooted at `id`.
    ///
    /// Returns `Ok(None)` when no such node is persisted.
    pub fn build_flattened_from(&self, id: NodeId) -> Result<Option<FlattenedTree>, StorageError> {
        match self.store.load(id)? {
            Some(node) => Ok(Some(self.flatten(&node)?)),
            None => Ok(None),
        }
    }

    /// Breadth-first emission of one subtree into the flat shape.
    fn flatten(&self, root: &TreeNode) -> Result<FlattenedTree, StorageError> {
        let mut entities: IndexMap<NodeId, WireNode> = IndexMap::new();
        let mut ids = Vec::new();
        let mut queue: VecDeque<(TreeNode, Option<NodeId>)> = VecDeque::new();
        queue.push_back((root.clone(), None));

        while let Some((node, parent)) = queue.pop_front() {
            // A node can be queued more than once before its first pop;
            // only the first occurrence is emitted.
            if entities.contains_key(&node.id) {
                continue;
            }
            let mut wire = WireNode::from_node(&node);
            wire.parent_step_id = parent;

            for &child_id in &node.children {
                // Skip self-loops and edges back to already-emitted nodes.
                if child_id == node.id || entities.contains_key(&child_id) {
                    continue;
                }
                let Some(child) = self.store.load(child_id)? else {
                    continue;
                };
                // The emitted child list only carries references that
                // actually resolve.
                wire.children.push(WireChild::Id(child_id));
                queue.push_back((child, Some(node.id)));
            }

            ids.push(node.id);
            entities.insert(node.id, wire);
        }

        Ok(FlattenedTree {
            entities,
            ids,
            root_step_id: Some(root.id),
            available_languages: self.languages.available_languages(),
        })
    }
}
