//! Mutation permission gate.
//!
//! The writer consults an [`AccessGuard`] before touching storage. The
//! check is deliberately coarse -- authenticated or not -- but sits behind
//! a trait so a finer-grained policy can be injected without changing the
//! tree logic.

use wizards_core::ActorId;

/// The principal attempting an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Identity recorded as node owner on save.
    pub id: ActorId,
    /// Whether the surrounding service authenticated this principal.
    pub authenticated: bool,
}

impl Actor {
    /// An authenticated principal.
    pub fn authenticated(id: ActorId) -> Self {
        Actor {
            id,
            authenticated: true,
        }
    }

    /// The anonymous principal.
    pub fn anonymous() -> Self {
        Actor {
            id: ActorId(0),
            authenticated: false,
        }
    }
}

/// Decides whether an actor may mutate the wizard tree.
pub trait AccessGuard {
    /// Returns `true` when the actor may create, update, or delete nodes.
    fn can_mutate(&self, actor: &Actor) -> bool;
}

/// Default policy: any authenticated actor may mutate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedGuard;

impl AccessGuard for AuthenticatedGuard {
    fn can_mutate(&self, actor: &Actor) -> bool {
        actor.authenticated
    }
}
