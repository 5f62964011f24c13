//! End-to-end tests for the read/reconcile/read cycle.
//!
//! Each test seeds an [`InMemoryStore`], materializes a tree through
//! [`TreeReader`], edits the wire payload the way a tree editor would,
//! saves it through [`TreeWriter`], and re-reads to verify the persisted
//! outcome.
//!
//! Tests cover:
//! - Idempotence of an unmodified flattened round trip
//! - Editor flow: create a step under an existing leaf and re-read
//! - Cascade delete driven by a partial payload
//! - Malformed (cyclic) graphs surviving the full cycle
//! - Partial edits leaving unmentioned siblings untouched

use wizards_core::{ActorId, NodeId, NodeKind, TreeNode, WireChild, WireNode};
use wizards_storage::{EntityStore, InMemoryStore, StaticLanguageCatalog};
use wizards_tree::{Actor, AuthenticatedGuard, SaveInput, TreeReader, TreeWriter};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn seed(store: &mut InMemoryStore, id: i64, kind: NodeKind, title: &str, children: &[i64]) {
    let mut node = TreeNode::new(kind);
    node.id = NodeId(id);
    node.fields.title = title.into();
    node.children = children.iter().map(|&c| NodeId(c)).collect();
    store.seed(node).unwrap();
}

/// wizard 1 -> steps 2, 3; step 2 -> step 4.
fn small_tree() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    seed(&mut store, 1, NodeKind::Wizard, "Root", &[2, 3]);
    seed(&mut store, 2, NodeKind::WizardStep, "Left", &[4]);
    seed(&mut store, 3, NodeKind::WizardStep, "Right", &[]);
    seed(&mut store, 4, NodeKind::WizardStep, "Leaf", &[]);
    store
}

fn actor() -> Actor {
    Actor::authenticated(ActorId(42))
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn unmodified_flattened_round_trip_is_idempotent() {
    let mut store = small_tree();
    let langs = StaticLanguageCatalog::default();

    let first = {
        let reader = TreeReader::new(&store, &langs);
        reader.build_flattened_from(NodeId(1)).unwrap().unwrap()
    };

    let guard = AuthenticatedGuard;
    let mut writer = TreeWriter::new(&mut store, &guard);
    let report = writer.save(first.clone(), &actor()).unwrap();
    assert!(report.is_clean());
    assert!(report.created.is_empty());
    assert!(report.deleted.is_empty());

    let reader = TreeReader::new(&store, &langs);
    let second = reader.build_flattened_from(NodeId(1)).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(second.ids, vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);
}

#[test]
fn unmodified_nested_round_trip_preserves_structure() {
    let mut store = small_tree();
    let langs = StaticLanguageCatalog::default();

    let tree = {
        let reader = TreeReader::new(&store, &langs);
        reader.build_nested_from(NodeId(1)).unwrap().unwrap()
    };

    let guard = AuthenticatedGuard;
    let mut writer = TreeWriter::new(&mut store, &guard);
    let report = writer.save(tree.clone(), &actor()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.updated.len(), 4);

    let reader = TreeReader::new(&store, &langs);
    let again = reader.build_nested_from(NodeId(1)).unwrap().unwrap();
    assert_eq!(tree, again);
}

// ---------------------------------------------------------------------------
// Editor flows
// ---------------------------------------------------------------------------

#[test]
fn editor_adds_step_under_leaf() {
    let mut store = small_tree();
    let langs = StaticLanguageCatalog::default();

    let mut flat = {
        let reader = TreeReader::new(&store, &langs);
        reader.build_flattened_from(NodeId(1)).unwrap().unwrap()
    };

    // The editor creates a new answer under leaf 4 with a placeholder ID
    // and records the reference in the parent's child list.
    let mut fresh = WireNode::default();
    fresh.id = NodeId(-1);
    fresh.title = "Brand new answer".into();
    fresh.parent_step_id = Some(NodeId(4));
    flat.entities
        .get_mut(&NodeId(4))
        .unwrap()
        .children
        .push(WireChild::Id(NodeId(-1)));
    flat.entities.insert(NodeId(-1), fresh);

    let guard = AuthenticatedGuard;
    let mut writer = TreeWriter::new(&mut store, &guard);
    let report = writer.save(flat, &actor()).unwrap();
    assert!(report.is_clean());
    let new_id = report.assigned(NodeId(-1)).unwrap();
    assert!(!new_id.is_placeholder());

    let reader = TreeReader::new(&store, &langs);
    let again = reader.build_flattened_from(NodeId(1)).unwrap().unwrap();
    assert_eq!(again.ids.len(), 5);
    assert_eq!(again.entities[&new_id].parent_step_id, Some(NodeId(4)));
    assert_eq!(
        again.entities[&NodeId(4)].children,
        vec![WireChild::Id(new_id)],
    );
    assert_eq!(again.entities[&new_id].title, "Brand new answer");
    assert_eq!(again.entities[&new_id].name, "brand_new_answer");
}

#[test]
fn editor_deletes_branch_with_partial_payload() {
    let mut store = small_tree();
    let langs = StaticLanguageCatalog::default();

    // Only the doomed node travels; its subtree exists in storage alone.
    let mut doomed = WireNode::default();
    doomed.id = NodeId(2);
    doomed.parent_step_id = Some(NodeId(1));
    doomed.delete = true;

    let guard = AuthenticatedGuard;
    let mut writer = TreeWriter::new(&mut store, &guard);
    let report = writer.save(doomed, &actor()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.deleted.len(), 2); // 2 and its stored child 4

    let reader = TreeReader::new(&store, &langs);
    let flat = reader.build_flattened_from(NodeId(1)).unwrap().unwrap();
    assert_eq!(flat.ids, vec![NodeId(1), NodeId(3)]);
    assert_eq!(
        flat.entities[&NodeId(1)].children,
        vec![WireChild::Id(NodeId(3))],
    );
}

#[test]
fn partial_edit_leaves_unmentioned_siblings_alone() {
    let mut store = small_tree();
    let langs = StaticLanguageCatalog::default();

    // Only node 3 travels.
    let mut edit = WireNode::default();
    edit.id = NodeId(3);
    edit.title = "Right, renamed".into();
    edit.parent_step_id = Some(NodeId(1));

    let guard = AuthenticatedGuard;
    let mut writer = TreeWriter::new(&mut store, &guard);
    let report = writer.save(edit, &actor()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.updated, vec![NodeId(3)]);

    let reader = TreeReader::new(&store, &langs);
    let flat = reader.build_flattened_from(NodeId(1)).unwrap().unwrap();
    assert_eq!(flat.ids, vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);
    assert_eq!(flat.entities[&NodeId(3)].title, "Right, renamed");
    assert_eq!(flat.entities[&NodeId(2)].title, "Left");
}

// ---------------------------------------------------------------------------
// Malformed graphs
// ---------------------------------------------------------------------------

#[test]
fn cyclic_graph_survives_full_cycle() {
    let mut store = InMemoryStore::new();
    seed(&mut store, 1, NodeKind::Wizard, "Root", &[2]);
    seed(&mut store, 2, NodeKind::WizardStep, "Loop", &[1]);
    let langs = StaticLanguageCatalog::default();

    let flat = {
        let reader = TreeReader::new(&store, &langs);
        reader.build_flattened_from(NodeId(1)).unwrap().unwrap()
    };
    assert_eq!(flat.ids, vec![NodeId(1), NodeId(2)]);

    // Saving the materialized view persists the cycle-free structure.
    let guard = AuthenticatedGuard;
    let mut writer = TreeWriter::new(&mut store, &guard);
    let report = writer.save(flat, &actor()).unwrap();
    assert!(report.is_clean());

    let back = store.load(NodeId(2)).unwrap().unwrap();
    assert!(back.children.is_empty());
}

// ---------------------------------------------------------------------------
// Permission gate
// ---------------------------------------------------------------------------

#[test]
fn anonymous_editor_cannot_save_a_read_tree() {
    let mut store = small_tree();
    let langs = StaticLanguageCatalog::default();
    let flat = {
        let reader = TreeReader::new(&store, &langs);
        reader.build_flattened_from(NodeId(1)).unwrap().unwrap()
    };
    let before = store.clone().into_nodes();

    let guard = AuthenticatedGuard;
    let mut writer = TreeWriter::new(&mut store, &guard);
    assert!(writer
        .save(SaveInput::from(flat), &Actor::anonymous())
        .is_err());
    assert_eq!(store.into_nodes(), before);
}
