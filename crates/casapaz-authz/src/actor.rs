//! The authenticated actor.

use casapaz_core::{Role, UserId};
use serde::{Deserialize, Serialize};

/// The authenticated caller of an operation.
///
/// Built from an already-verified credential by the HTTP layer; the
/// engine trusts the fields once handed to it, except that an inactive
/// actor is denied outright before any other evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The user id of the caller.
    pub id: UserId,
    /// The caller's role (capability tag, not structural position).
    pub role: Role,
    /// Whether the account is active. Inactive actors are always denied.
    pub active: bool,
}

impl Actor {
    /// An active actor with the given id and role.
    #[must_use]
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            active: true,
        }
    }

    /// The same actor, marked inactive.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_active() {
        let actor = Actor::new(UserId::from_i64(1), Role::SuperAdmin);
        assert!(actor.active);
        assert_eq!(actor.role, Role::SuperAdmin);
    }

    #[test]
    fn test_deactivated() {
        let actor = Actor::new(UserId::from_i64(1), Role::GroupLeader).deactivated();
        assert!(!actor.active);
    }
}
