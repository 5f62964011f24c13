//! Tree-service error types.
//!
//! Whole-save refusals live here. Failures scoped to a single node of a
//! batch are not errors at this level -- they are collected in the
//! [`SaveReport`](crate::report::SaveReport) instead.

use thiserror::Error;

/// Errors that reject a save before or instead of any write.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The access guard refused the actor. Nothing was written.
    #[error("actor is not allowed to mutate the wizard tree")]
    PermissionDenied,
}
