//! The persisted wizard tree entity.
//!
//! [`TreeNode`] is the storage-side representation of one step in a wizard
//! decision tree: a typed kind (root wizard vs. nested step), a bag of
//! pass-through presentational scalars, and an ordered list of child IDs --
//! the only structural field the tree logic interprets.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::{ActorId, NodeId};

/// Ordered child references. Most steps have only a handful of answers,
/// so the list stays inline.
pub type Children = SmallVec<[NodeId; 4]>;

/// The two node kinds a wizard tree is built from.
///
/// `Wizard` is root-only; every non-root node is a `WizardStep`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a decision tree.
    Wizard,
    /// Non-root step, child of a wizard or another step.
    #[default]
    WizardStep,
}

impl NodeKind {
    /// Returns `true` for the root-only kind.
    pub fn is_root(self) -> bool {
        matches!(self, NodeKind::Wizard)
    }
}

/// Body text together with its rich-text format tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    /// The raw markup.
    pub value: String,
    /// Format tag the rendering layer dispatches on.
    pub format: String,
}

impl RichText {
    /// The format tag stamped onto every saved body.
    pub const FULL_HTML: &'static str = "full_html";

    /// Wraps a value in the standard `full_html` format.
    pub fn full_html(value: impl Into<String>) -> Self {
        RichText {
            value: value.into(),
            format: Self::FULL_HTML.to_string(),
        }
    }
}

impl Default for RichText {
    fn default() -> Self {
        RichText::full_html(String::new())
    }
}

/// Pass-through presentational and behavioral scalars.
///
/// None of these are interpreted by the tree logic; they are carried
/// verbatim between the wire representation and storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepFields {
    pub title: String,
    pub body: RichText,
    pub page_intro: String,
    pub hide_page_intro: bool,
    pub meta_description: String,
    pub short_description: String,
    pub page_type: String,
    pub language_toggle: bool,
    /// Locale tag of this node's translation.
    pub language: String,
    pub header_html: String,
    pub css_icon: String,
    pub footer_html: String,
    pub for_contact_center_use_only: bool,
    pub faq: String,
    pub custom_twig_content: String,
    pub exclude_from_contact_center: bool,
    /// Primary voice-assistant utterance.
    pub primary_utterance: String,
    /// Alternative voice-assistant utterances.
    pub aliases: String,
}

/// One persisted node of a wizard tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Stable identifier once persisted; placeholder before the first save.
    pub id: NodeId,
    /// Node kind. Fixed at creation.
    pub kind: NodeKind,
    /// Pass-through scalars.
    #[serde(default)]
    pub fields: StepFields,
    /// Ordered child references. Order is significant and must round-trip.
    #[serde(default)]
    pub children: Children,
    /// Principal who last saved this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ActorId>,
    /// Whether the node is visible to root enumeration.
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl TreeNode {
    /// Creates an unsaved node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        TreeNode {
            id: NodeId::PLACEHOLDER,
            kind,
            fields: StepFields::default(),
            children: Children::new(),
            owner: None,
            published: true,
        }
    }

    /// Returns `true` once storage has assigned a real identity.
    pub fn is_persisted(&self) -> bool {
        !self.id.is_placeholder()
    }

    /// Appends a child reference unless it is already present.
    ///
    /// Returns `true` if the list changed.
    pub fn attach_child(&mut self, id: NodeId) -> bool {
        if self.children.contains(&id) {
            return false;
        }
        self.children.push(id);
        true
    }

    /// Removes every occurrence of a child reference.
    ///
    /// Returns `true` if the list changed.
    pub fn detach_child(&mut self, id: NodeId) -> bool {
        let before = self.children.len();
        self.children.retain(|c| *c != id);
        self.children.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_unsaved_and_published() {
        let node = TreeNode::new(NodeKind::Wizard);
        assert!(!node.is_persisted());
        assert!(node.published);
        assert!(node.children.is_empty());
        assert!(node.owner.is_none());
    }

    #[test]
    fn kind_root_check() {
        assert!(NodeKind::Wizard.is_root());
        assert!(!NodeKind::WizardStep.is_root());
    }

    #[test]
    fn rich_text_default_is_full_html() {
        let body = RichText::default();
        assert_eq!(body.format, RichText::FULL_HTML);
        assert!(body.value.is_empty());
    }

    #[test]
    fn attach_child_deduplicates() {
        let mut node = TreeNode::new(NodeKind::Wizard);
        assert!(node.attach_child(NodeId(5)));
        assert!(node.attach_child(NodeId(6)));
        assert!(!node.attach_child(NodeId(5)));
        assert_eq!(node.children.as_slice(), &[NodeId(5), NodeId(6)]);
    }

    #[test]
    fn detach_child_removes_all_occurrences() {
        let mut node = TreeNode::new(NodeKind::Wizard);
        node.children = Children::from_slice(&[NodeId(1), NodeId(2), NodeId(1)]);
        assert!(node.detach_child(NodeId(1)));
        assert_eq!(node.children.as_slice(), &[NodeId(2)]);
        assert!(!node.detach_child(NodeId(9)));
    }

    #[test]
    fn children_order_preserved() {
        let mut node = TreeNode::new(NodeKind::Wizard);
        for raw in [30, 10, 20] {
            node.attach_child(NodeId(raw));
        }
        assert_eq!(
            node.children.as_slice(),
            &[NodeId(30), NodeId(10), NodeId(20)],
        );
    }

    #[test]
    fn serde_roundtrip_tree_node() {
        let mut node = TreeNode::new(NodeKind::WizardStep);
        node.id = NodeId(12);
        node.fields.title = "How do I renew a passport?".into();
        node.fields.body = RichText::full_html("<p>Pick one.</p>");
        node.children = Children::from_slice(&[NodeId(13), NodeId(14)]);
        node.owner = Some(ActorId(3));

        let json = serde_json::to_string(&node).unwrap();
        let back: TreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn deserialize_defaults_published() {
        let json = r#"{"id": 4, "kind": "wizard"}"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        assert!(node.published);
        assert_eq!(node.kind, NodeKind::Wizard);
        assert!(node.children.is_empty());
    }
}
