//! Wire representations of a wizard tree.
//!
//! Two shapes cross the boundary to editing clients:
//!
//! - **Nested**: children are embedded [`WireNode`] values, recursively.
//! - **Flattened**: all nodes sit side by side in one id-keyed map
//!   ([`FlattenedTree`]), linked via `parentStepId`, with children as bare
//!   IDs.
//!
//! [`WireChild`] is an untagged enum, so a JSON number deserializes as a
//! child reference and a JSON object as an embedded node -- which is also
//! exactly the probe the writer uses to tell the two shapes apart.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::node::{NodeKind, TreeNode};

/// Derives the machine-safe slug for a step.
///
/// Lowercases the title and replaces spaces and hyphens with underscores.
/// An empty title falls back to `wizard_step_<id>`.
pub fn step_name(title: &str, id: NodeId) -> String {
    if title.is_empty() {
        return format!("wizard_step_{}", id);
    }
    title
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// One child entry of a [`WireNode`]: a bare reference (flattened shape)
/// or an embedded node (nested shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireChild {
    /// Reference to a child by ID.
    Id(NodeId),
    /// Fully embedded child node.
    Node(WireNode),
}

impl WireChild {
    /// Returns the referenced ID for both variants.
    pub fn id(&self) -> NodeId {
        match self {
            WireChild::Id(id) => *id,
            WireChild::Node(node) => node.id,
        }
    }

    /// Returns `true` for an embedded node.
    pub fn is_node(&self) -> bool {
        matches!(self, WireChild::Node(_))
    }
}

/// One node of a wizard tree as seen by editing clients.
///
/// Every scalar is optional on the way in; a payload as small as
/// `{"id": 5, "delete": true}` is a valid edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireNode {
    /// Node kind tag.
    pub node_type: NodeKind,
    /// Machine-safe slug derived from the title. Informational; the writer
    /// recomputes nothing from it.
    pub name: String,
    pub title: String,
    /// Real ID, or a placeholder for a node the editor just created.
    pub id: NodeId,
    pub page_intro: String,
    pub hide_page_intro: bool,
    pub meta_description: String,
    pub short_description: String,
    pub page_type: String,
    pub language_toggle: bool,
    pub language: String,
    /// Body markup. The format tag is fixed server-side, so only the value
    /// travels.
    pub body: String,
    #[serde(rename = "headerHTML")]
    pub header_html: String,
    pub css_icon: String,
    #[serde(rename = "footerHTML")]
    pub footer_html: String,
    pub for_contact_center_use_only: bool,
    pub faq: String,
    pub custom_twig_content: String,
    pub exclude_from_contact_center: bool,
    pub primary_utterance: String,
    pub aliases: String,
    /// Ordered children: embedded nodes (nested) or bare IDs (flattened).
    pub children: Vec<WireChild>,
    /// Owning parent in the flattened shape; `None` for roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_step_id: Option<NodeId>,
    /// Requests cascade deletion of this node and its subtree.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub delete: bool,
}

impl WireNode {
    /// Projects a persisted node into its wire form.
    ///
    /// `children` starts empty; the reader fills it with embedded nodes or
    /// verified ID references depending on the build shape.
    pub fn from_node(node: &TreeNode) -> Self {
        let f = &node.fields;
        WireNode {
            node_type: node.kind,
            name: step_name(&f.title, node.id),
            title: f.title.clone(),
            id: node.id,
            page_intro: f.page_intro.clone(),
            hide_page_intro: f.hide_page_intro,
            meta_description: f.meta_description.clone(),
            short_description: f.short_description.clone(),
            page_type: f.page_type.clone(),
            language_toggle: f.language_toggle,
            language: f.language.clone(),
            body: f.body.value.clone(),
            header_html: f.header_html.clone(),
            css_icon: f.css_icon.clone(),
            footer_html: f.footer_html.clone(),
            for_contact_center_use_only: f.for_contact_center_use_only,
            faq: f.faq.clone(),
            custom_twig_content: f.custom_twig_content.clone(),
            exclude_from_contact_center: f.exclude_from_contact_center,
            primary_utterance: f.primary_utterance.clone(),
            aliases: f.aliases.clone(),
            children: Vec::new(),
            parent_step_id: None,
            delete: false,
        }
    }
}

/// An available translation language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    /// Locale tag, e.g. `en` or `es`.
    pub id: String,
    /// Native display name.
    pub name: String,
    /// Sort weight.
    pub weight: i32,
}

/// The flattened wire shape: one subtree with every node at the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedTree {
    /// All nodes keyed by ID, in breadth-first emission order.
    pub entities: IndexMap<NodeId, WireNode>,
    /// Emission order, same as `entities` iteration order.
    #[serde(default)]
    pub ids: Vec<NodeId>,
    /// The subtree root, when the build started from a valid node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_step_id: Option<NodeId>,
    /// Translation languages the editing client may offer.
    #[serde(default)]
    pub available_languages: Vec<LanguageInfo>,
}
