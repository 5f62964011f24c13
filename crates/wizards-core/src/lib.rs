pub mod id;
pub mod node;
pub mod wire;

// Re-export commonly used types
pub use id::{ActorId, NodeId};
pub use node::{Children, NodeKind, RichText, StepFields, TreeNode};
pub use wire::{step_name, FlattenedTree, LanguageInfo, WireChild, WireNode};
