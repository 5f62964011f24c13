//! In-memory implementation of [`EntityStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests, snapshot
//! fixtures, and anywhere persistence isn't needed. It stores all nodes in
//! a HashMap with the same semantics a persistent backend would provide:
//! monotone ID assignment, not-found on stale updates, idempotent deletes.

use std::collections::HashMap;

use wizards_core::{LanguageInfo, NodeId, NodeKind, TreeNode};

use crate::error::StorageError;
use crate::traits::{EntityStore, LanguageCatalog};

/// In-memory implementation of [`EntityStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    nodes: HashMap<NodeId, TreeNode>,
    next_id: i64,
}

impl InMemoryStore {
    /// Creates a new empty store. The first inserted node gets ID 1.
    pub fn new() -> Self {
        InMemoryStore {
            nodes: HashMap::new(),
            next_id: 1,
        }
    }

    /// Builds a store from already-identified nodes.
    ///
    /// ID assignment continues after the highest seeded ID. Nodes carrying
    /// placeholder IDs are skipped -- a snapshot can only hold persisted
    /// nodes.
    pub fn from_nodes(nodes: impl IntoIterator<Item = TreeNode>) -> Self {
        let mut store = InMemoryStore::new();
        for node in nodes {
            store.seed(node);
        }
        store
    }

    /// Inserts a node under its own ID, keeping the ID counter ahead of it.
    ///
    /// Returns the node's ID, or `None` if the node carried a placeholder
    /// and was skipped.
    pub fn seed(&mut self, node: TreeNode) -> Option<NodeId> {
        if node.id.is_placeholder() {
            return None;
        }
        let id = node.id;
        self.next_id = self.next_id.max(id.0 + 1);
        self.nodes.insert(id, node);
        Some(id)
    }

    /// Drains the store into a deterministic node list, sorted by ID.
    pub fn into_nodes(self) -> Vec<TreeNode> {
        let mut nodes: Vec<TreeNode> = self.nodes.into_values().collect();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    /// Number of persisted nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when nothing is persisted.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl EntityStore for InMemoryStore {
    fn load(&self, id: NodeId) -> Result<Option<TreeNode>, StorageError> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn insert(&mut self, mut node: TreeNode) -> Result<NodeId, StorageError> {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    fn update(&mut self, node: &TreeNode) -> Result<(), StorageError> {
        if !self.nodes.contains_key(&node.id) {
            return Err(StorageError::NodeNotFound { id: node.id });
        }
        self.nodes.insert(node.id, node.clone());
        Ok(())
    }

    fn delete(&mut self, id: NodeId) -> Result<(), StorageError> {
        self.nodes.remove(&id);
        Ok(())
    }

    fn query_roots(&self) -> Result<Vec<NodeId>, StorageError> {
        let mut roots: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.kind == NodeKind::Wizard && n.published)
            .map(|n| n.id)
            .collect();
        roots.sort();
        Ok(roots)
    }
}

/// A fixed, in-memory [`LanguageCatalog`].
#[derive(Debug, Clone, Default)]
pub struct StaticLanguageCatalog {
    languages: Vec<LanguageInfo>,
}

impl StaticLanguageCatalog {
    /// Wraps a fixed language list.
    pub fn new(languages: Vec<LanguageInfo>) -> Self {
        StaticLanguageCatalog { languages }
    }
}

impl LanguageCatalog for StaticLanguageCatalog {
    fn available_languages(&self) -> Vec<LanguageInfo> {
        self.languages.clone()
    }
}
