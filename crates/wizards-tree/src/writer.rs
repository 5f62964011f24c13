//! Tree reconciliation: the write half of the wizard tree service.
//!
//! [`TreeWriter`] accepts an edited tree in either wire shape and diffs it
//! against persisted parent/child linkage, performing creates, updates,
//! and cascading deletes. The hard part is ID churn: the editor sends
//! placeholder IDs for nodes it just created, and every reference to a
//! placeholder must point at the storage-assigned ID by the time the save
//! completes.
//!
//! The flattened path works on a working copy of the payload, one node
//! per iteration, each node removed from the copy once handled. Because a
//! child can be processed before or after its parent, the pass keeps a
//! placeholder-to-real map for forward rewrites and runs a *reverse
//! wiring* step whenever a new ID is assigned: the freshly created node
//! patches itself into its parent's child list, whether that parent still
//! sits in the working copy or has to be loaded back from storage.
//!
//! Nothing here is transactional. A failure is confined to the node that
//! caused it and recorded in the [`SaveReport`]; store deletes are
//! idempotent, so re-running the same save after a crash is safe.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use serde::Deserialize;

use wizards_core::{
    Children, FlattenedTree, NodeId, NodeKind, RichText, StepFields, TreeNode, WireChild,
    WireNode,
};
use wizards_storage::{EntityStore, StorageError};

use crate::error::SaveError;
use crate::guard::{AccessGuard, Actor};
use crate::report::{CreatedId, NodeError, SaveReport};

/// An edited tree handed to [`TreeWriter::save`].
///
/// Deserialization accepts both the wrapped flattened payload the reader
/// produces and a bare id-keyed map of nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SaveInput {
    /// Wrapped flattened payload (`{entities, ids, ...}`).
    Flattened(FlattenedTree),
    /// Bare map of wire nodes keyed by ID.
    Entities(IndexMap<NodeId, WireNode>),
}

impl SaveInput {
    /// Collapses either input form into one map, re-keyed by each node's
    /// own ID.
    fn normalize(self) -> IndexMap<NodeId, WireNode> {
        let entities = match self {
            SaveInput::Flattened(flat) => flat.entities,
            SaveInput::Entities(map) => map,
        };
        entities.into_values().map(|n| (n.id, n)).collect()
    }
}

impl From<FlattenedTree> for SaveInput {
    fn from(flat: FlattenedTree) -> Self {
        SaveInput::Flattened(flat)
    }
}

impl From<IndexMap<NodeId, WireNode>> for SaveInput {
    fn from(map: IndexMap<NodeId, WireNode>) -> Self {
        SaveInput::Entities(map)
    }
}

impl From<WireNode> for SaveInput {
    fn from(node: WireNode) -> Self {
        let mut map = IndexMap::new();
        map.insert(node.id, node);
        SaveInput::Entities(map)
    }
}

/// Reconciles edited wizard trees into storage.
pub struct TreeWriter<'a, S, G> {
    store: &'a mut S,
    guard: &'a G,
}

impl<'a, S: EntityStore, G: AccessGuard> TreeWriter<'a, S, G> {
    /// Creates a writer over the given store, gated by `guard`.
    pub fn new(store: &'a mut S, guard: &'a G) -> Self {
        TreeWriter { store, guard }
    }

    /// Saves an edited tree.
    ///
    /// The payload shape is detected from the first node's children: any
    /// embedded node means nested, bare IDs mean flattened. Only the first
    /// node is probed; a mixed payload is taken at the first node's word.
    ///
    /// Returns [`SaveError::PermissionDenied`] -- with zero writes -- when
    /// the guard refuses the actor. Every other failure is scoped to the
    /// node that caused it and recorded in the returned report.
    pub fn save(
        &mut self,
        input: impl Into<SaveInput>,
        actor: &Actor,
    ) -> Result<SaveReport, SaveError> {
        if !self.guard.can_mutate(actor) {
            return Err(SaveError::PermissionDenied);
        }

        let tree = input.into().normalize();
        let mut report = SaveReport::default();
        if tree.is_empty() {
            return Ok(report);
        }

        if looks_nested(&tree) {
            for step in tree.values() {
                if let Err(e) = self.save_step(step, actor, &mut report) {
                    tracing::warn!("failed to save step {}: {}", step.id, e);
                    report.errors.push(NodeError {
                        id: step.id,
                        reason: e.to_string(),
                    });
                }
            }
        } else {
            self.save_flattened(tree, actor, &mut report);
        }

        Ok(report)
    }

    /// Saves one nested subtree, optionally attaching its root under an
    /// existing persisted parent.
    pub fn save_subtree(
        &mut self,
        step: &WireNode,
        parent: Option<NodeId>,
        actor: &Actor,
    ) -> Result<SaveReport, SaveError> {
        if !self.guard.can_mutate(actor) {
            return Err(SaveError::PermissionDenied);
        }

        let mut report = SaveReport::default();
        match self.save_step(step, actor, &mut report) {
            Ok(Some(id)) => {
                if let Some(pid) = parent {
                    if let Err(e) = self.attach_to_parent(pid, id, &mut report) {
                        report.errors.push(NodeError {
                            id: pid,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("failed to save step {}: {}", step.id, e);
                report.errors.push(NodeError {
                    id: step.id,
                    reason: e.to_string(),
                });
            }
        }
        Ok(report)
    }

    // -------------------------------------------------------------------
    // Nested path
    // -------------------------------------------------------------------

    /// Recursively saves one node and its embedded children.
    ///
    /// Children are saved *before* the parent wires its child list, so
    /// only real IDs ever land in storage. Returns the node's real ID, or
    /// `None` when the node was deleted.
    fn save_step(
        &mut self,
        step: &WireNode,
        actor: &Actor,
        report: &mut SaveReport,
    ) -> Result<Option<NodeId>, StorageError> {
        if step.delete {
            self.delete_nested(step, report)?;
            return Ok(None);
        }

        let existing = if step.id.is_placeholder() {
            None
        } else {
            // A stale ID that no longer resolves falls through to create.
            self.store.load(step.id)?
        };
        let is_new = existing.is_none();
        let mut node = existing.unwrap_or_else(|| TreeNode::new(NodeKind::WizardStep));
        apply_fields(&mut node, step, actor);

        let mut children = Children::new();
        for child in &step.children {
            match child {
                WireChild::Node(embedded) => match self.save_step(embedded, actor, report) {
                    Ok(Some(id)) => children.push(id),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("failed to save step {}: {}", embedded.id, e);
                        report.errors.push(NodeError {
                            id: embedded.id,
                            reason: e.to_string(),
                        });
                    }
                },
                // A bare reference in a nested payload keeps an existing
                // link as-is; an unresolved placeholder is dropped.
                WireChild::Id(id) if !id.is_placeholder() => children.push(*id),
                WireChild::Id(_) => {}
            }
        }
        node.children = children;

        if is_new {
            let id = self.store.insert(node)?;
            tracing::debug!("created node {} (wire id {})", id, step.id);
            report.created.push(CreatedId {
                wire_id: step.id,
                id,
            });
            Ok(Some(id))
        } else {
            self.store.update(&node)?;
            tracing::debug!("updated node {}", node.id);
            report.updated.push(node.id);
            Ok(Some(node.id))
        }
    }

    /// Deletes one nested subtree, children before self.
    fn delete_nested(
        &mut self,
        step: &WireNode,
        report: &mut SaveReport,
    ) -> Result<(), StorageError> {
        for child in &step.children {
            match child {
                WireChild::Node(embedded) => {
                    if let Err(e) = self.delete_nested(embedded, report) {
                        tracing::warn!("failed to delete step {}: {}", embedded.id, e);
                        report.errors.push(NodeError {
                            id: embedded.id,
                            reason: e.to_string(),
                        });
                    }
                }
                // A bare reference cascades through storage.
                WireChild::Id(id) if !id.is_placeholder() => {
                    self.delete_persisted_subtree(*id, report)?;
                }
                WireChild::Id(_) => {}
            }
        }

        if !step.id.is_placeholder() && self.store.load(step.id)?.is_some() {
            self.store.delete(step.id)?;
            tracing::debug!("deleted node {}", step.id);
            report.deleted.push(step.id);
        }
        Ok(())
    }

    /// Deletes a persisted node and every descendant reachable through
    /// storage, deepest first.
    fn delete_persisted_subtree(
        &mut self,
        root: NodeId,
        report: &mut SaveReport,
    ) -> Result<(), StorageError> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            if let Some(node) = self.store.load(current)? {
                for &child in &node.children {
                    if !seen.contains(&child) {
                        queue.push_back(child);
                    }
                }
            }
        }

        for &id in order.iter().rev() {
            if self.store.load(id)?.is_some() {
                self.store.delete(id)?;
                tracing::debug!("deleted node {}", id);
                report.deleted.push(id);
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Flattened path
    // -------------------------------------------------------------------

    /// One pass over the flattened working copy. Each node is handled
    /// independently and removed from the copy afterwards; cascade deletes
    /// may consume further entries ahead of the iteration.
    fn save_flattened(
        &mut self,
        tree: IndexMap<NodeId, WireNode>,
        actor: &Actor,
        report: &mut SaveReport,
    ) {
        let mut working = tree;
        let mut resolved: HashMap<NodeId, NodeId> = HashMap::new();
        let order: Vec<NodeId> = working.keys().copied().collect();

        for wire_id in order {
            let Some(step) = working.shift_remove(&wire_id) else {
                // Already consumed by an earlier cascade delete.
                continue;
            };
            let outcome = if step.delete {
                self.delete_flattened(&step, &mut working, &resolved, report)
            } else {
                self.upsert_flattened(&step, &mut working, &mut resolved, actor, report)
            };
            if let Err(e) = outcome {
                tracing::warn!("failed to save step {}: {}", step.id, e);
                report.errors.push(NodeError {
                    id: step.id,
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Creates or updates one flattened node.
    fn upsert_flattened(
        &mut self,
        step: &WireNode,
        working: &mut IndexMap<NodeId, WireNode>,
        resolved: &mut HashMap<NodeId, NodeId>,
        actor: &Actor,
        report: &mut SaveReport,
    ) -> Result<(), StorageError> {
        let existing = if step.id.is_placeholder() {
            None
        } else {
            self.store.load(step.id)?
        };
        let is_new = existing.is_none();
        let mut node = existing.unwrap_or_else(|| {
            // A parentless node is a tree root; everything else is a step.
            let kind = if step.parent_step_id.is_none() {
                NodeKind::Wizard
            } else {
                NodeKind::WizardStep
            };
            TreeNode::new(kind)
        });
        apply_fields(&mut node, step, actor);

        // Rewrite child references already resolved in this pass, then
        // drop the placeholders that remain: a child not yet processed
        // re-attaches itself via reverse wiring once its save assigns a
        // real ID.
        node.children = step
            .children
            .iter()
            .map(WireChild::id)
            .map(|c| resolve(resolved, c))
            .filter(|c| !c.is_placeholder())
            .collect();

        let real = if is_new {
            let id = self.store.insert(node)?;
            tracing::debug!("created node {} (wire id {})", id, step.id);
            report.created.push(CreatedId {
                wire_id: step.id,
                id,
            });
            id
        } else {
            self.store.update(&node)?;
            tracing::debug!("updated node {}", node.id);
            report.updated.push(node.id);
            node.id
        };

        if is_new {
            resolved.insert(step.id, real);
            self.reverse_wire(step, real, working, resolved, report)?;
        }
        Ok(())
    }

    /// Patches a freshly assigned ID into the parent's child list.
    ///
    /// Runs unconditionally for every new ID, so parent and child are
    /// reunited no matter which of them the pass processed first.
    fn reverse_wire(
        &mut self,
        step: &WireNode,
        real: NodeId,
        working: &mut IndexMap<NodeId, WireNode>,
        resolved: &HashMap<NodeId, NodeId>,
        report: &mut SaveReport,
    ) -> Result<(), StorageError> {
        let Some(parent_ref) = step.parent_step_id else {
            return Ok(());
        };
        let pid = resolve(resolved, parent_ref);

        if let Some(parent) = working.get_mut(&pid) {
            // Swap the old reference in place to keep its position; append
            // when the parent did not list this child at all.
            if let Some(slot) = parent.children.iter_mut().find(|c| c.id() == step.id) {
                *slot = WireChild::Id(real);
            } else {
                parent.children.push(WireChild::Id(real));
            }
        } else if let Some(mut parent) = self.store.load(pid)? {
            // The parent was saved earlier in this pass, or was never part
            // of the edit. Its persisted child list is patched directly.
            if parent.attach_child(real) {
                self.store.update(&parent)?;
                report.updated.push(pid);
            }
        }
        Ok(())
    }

    /// Deletes one flattened node with its full cascade.
    fn delete_flattened(
        &mut self,
        step: &WireNode,
        working: &mut IndexMap<NodeId, WireNode>,
        resolved: &HashMap<NodeId, NodeId>,
        report: &mut SaveReport,
    ) -> Result<(), StorageError> {
        // Detach from the parent first, so no parent keeps referencing a
        // deleted child.
        if let Some(parent_ref) = step.parent_step_id {
            let pid = resolve(resolved, parent_ref);
            if let Some(parent) = working.get_mut(&pid) {
                parent.children.retain(|c| c.id() != step.id);
            } else if !step.id.is_placeholder() {
                if let Some(mut parent) = self.store.load(pid)? {
                    if parent.detach_child(step.id) {
                        self.store.update(&parent)?;
                        report.updated.push(pid);
                    }
                }
            }
        }

        // The cascade covers the union of the edited tree and storage, so
        // a partial edit of a larger persisted subtree still deletes
        // everything underneath this node.
        let mut order: Vec<NodeId> = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::from([step.id]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);

            let wire_children: Vec<NodeId> = if current == step.id {
                step.children.iter().map(WireChild::id).collect()
            } else {
                working
                    .get(&current)
                    .map(|n| n.children.iter().map(WireChild::id).collect())
                    .unwrap_or_default()
            };
            for child in wire_children {
                if !seen.contains(&child) {
                    queue.push_back(child);
                }
            }

            if !current.is_placeholder() {
                if let Some(node) = self.store.load(current)? {
                    for &child in &node.children {
                        if !seen.contains(&child) {
                            queue.push_back(child);
                        }
                    }
                }
            }
        }

        // Deepest layer first: reversing the breadth-first order deletes
        // leaves before the nodes referencing them.
        for &id in order.iter().rev() {
            working.shift_remove(&id);
            if !id.is_placeholder() && self.store.load(id)?.is_some() {
                self.store.delete(id)?;
                tracing::debug!("deleted node {}", id);
                report.deleted.push(id);
            }
        }
        Ok(())
    }

    /// Appends `child` to a persisted parent's child list.
    fn attach_to_parent(
        &mut self,
        pid: NodeId,
        child: NodeId,
        report: &mut SaveReport,
    ) -> Result<(), StorageError> {
        if let Some(mut parent) = self.store.load(pid)? {
            if parent.attach_child(child) {
                self.store.update(&parent)?;
                report.updated.push(pid);
            }
        }
        Ok(())
    }
}

/// Shape probe: any embedded node among the first node's children means
/// the payload is nested.
fn looks_nested(tree: &IndexMap<NodeId, WireNode>) -> bool {
    tree.values()
        .next()
        .is_some_and(|n| n.children.iter().any(WireChild::is_node))
}

/// Maps an ID through the placeholder assignments of the current pass.
fn resolve(resolved: &HashMap<NodeId, NodeId>, id: NodeId) -> NodeId {
    resolved.get(&id).copied().unwrap_or(id)
}

/// Copies every wire scalar onto the persisted node and stamps ownership.
/// The body always carries the fixed `full_html` format tag.
fn apply_fields(node: &mut TreeNode, step: &WireNode, actor: &Actor) {
    node.fields = StepFields {
        title: step.title.clone(),
        body: RichText::full_html(step.body.clone()),
        page_intro: step.page_intro.clone(),
        hide_page_intro: step.hide_page_intro,
        meta_description: step.meta_description.clone(),
        short_description: step.short_description.clone(),
        page_type: step.page_type.clone(),
        language_toggle: step.language_toggle,
        language: step.language.clone(),
        header_html: step.header_html.clone(),
        css_icon: step.css_icon.clone(),
        footer_html: step.footer_html.clone(),
        for_contact_center_use_only: step.for_contact_center_use_only,
        faq: step.faq.clone(),
        custom_twig_content: step.custom_twig_content.clone(),
        exclude_from_contact_center: step.exclude_from_contact_center,
        primary_utterance: step.primary_utterance.clone(),
        aliases: step.aliases.clone(),
    };
    node.owner = Some(actor.id);
}
