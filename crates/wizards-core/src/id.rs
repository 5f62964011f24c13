//! Stable ID newtypes for tree entities.
//!
//! All IDs are distinct newtype wrappers over `i64`, providing type safety
//! so that a `NodeId` cannot be accidentally used where an `ActorId` is
//! expected. Persisted node IDs are positive; any non-positive value is a
//! placeholder marking a node the editor created but storage has not yet
//! assigned an identity to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Positive once persisted. Editors send `NodeId::PLACEHOLDER` (or any
/// non-positive value) for nodes that do not exist in storage yet; the
/// writer assigns the real ID during a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl NodeId {
    /// The conventional placeholder sentinel for a not-yet-persisted node.
    pub const PLACEHOLDER: NodeId = NodeId(-1);

    /// Returns `true` if this ID has not been assigned by storage.
    pub fn is_placeholder(self) -> bool {
        self.0 <= 0
    }
}

/// Identity of the principal performing a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub i64);

// Display implementations -- just print the inner value.

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(format!("{}", NodeId(7)), "7");
        assert_eq!(format!("{}", NodeId(-1)), "-1");
    }

    #[test]
    fn actor_id_display() {
        assert_eq!(format!("{}", ActorId(99)), "99");
    }

    #[test]
    fn placeholder_detection() {
        assert!(NodeId::PLACEHOLDER.is_placeholder());
        assert!(NodeId(0).is_placeholder());
        assert!(NodeId(-42).is_placeholder());
        assert!(!NodeId(1).is_placeholder());
    }

    #[test]
    fn default_is_placeholder() {
        // A defaulted ID must never alias a persisted node.
        assert!(NodeId::default().is_placeholder());
    }

    #[test]
    fn serde_roundtrip() {
        let id = NodeId(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    proptest! {
        // JSON objects stringify their keys; the round trip must survive
        // that for id-keyed maps like the flattened entities map.
        #[test]
        fn map_key_roundtrip(raw in any::<i64>(), value in any::<i32>()) {
            let mut map = HashMap::new();
            map.insert(NodeId(raw), value);
            let json = serde_json::to_string(&map).unwrap();
            let back: HashMap<NodeId, i32> = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(map, back);
        }
    }
}
