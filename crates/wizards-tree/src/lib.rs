//! Wizard tree read/write service.
//!
//! The tree logic sits between the wire shapes of [`wizards_core`] and the
//! storage boundary of [`wizards_storage`]:
//!
//! - [`TreeReader`] materializes persisted trees into the nested or
//!   flattened wire shape, tolerating cyclic and diamond-shaped graphs.
//! - [`TreeWriter`] reconciles an edited tree back into storage --
//!   creates, updates, reparent-by-rewire for fresh IDs, and cascading
//!   deletes -- and reports the outcome per node.
//! - [`AccessGuard`] gates every mutation behind a permission check.
//!
//! # Modules
//!
//! - [`error`]: whole-save refusals
//! - [`guard`]: Actor and the mutation permission gate
//! - [`reader`]: nested and flattened tree builds
//! - [`report`]: structured per-node save outcomes
//! - [`writer`]: the reconciliation pass

pub mod error;
pub mod guard;
pub mod reader;
pub mod report;
pub mod writer;

// Re-export key types for ergonomic use.
pub use error::SaveError;
pub use guard::{AccessGuard, Actor, AuthenticatedGuard};
pub use reader::TreeReader;
pub use report::{CreatedId, NodeError, SaveReport};
pub use writer::{SaveInput, TreeWriter};
