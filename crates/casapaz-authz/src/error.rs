//! Error taxonomy for authorization and mutation guarding.
//!
//! Every variant carries enough context to render a message naming the
//! specific id or field involved, and a stable machine-readable code for
//! API clients. A denial is never downgraded to "not found": callers can
//! always distinguish "exists but forbidden" from "does not exist".

use casapaz_core::{GroupId, Role, UserId};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Why an action was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum DenyReason {
    /// The actor's account is deactivated.
    InactiveActor,
    /// The action is reserved for Super Admin under the current policy.
    InsufficientRank,
    /// The target lies outside the subnet the actor supervises.
    OutsideSupervisionScope {
        /// The subnet leader who attempted the action.
        actor: UserId,
        /// The group containing the target, if the target has one.
        group: Option<GroupId>,
    },
    /// The target belongs to a group the actor does not lead.
    NotOwned {
        /// The group leader who attempted the action.
        actor: UserId,
        /// The group containing the target, if the target has one.
        group: Option<GroupId>,
    },
    /// Moving a member between groups requires a subnet leader or a
    /// global role, even for the member's own leader.
    ReassignmentRequiresHigherRole,
    /// The actor's role is not permitted to perform this action at all.
    RoleNotPermitted {
        /// The role that attempted the action.
        role: Role,
    },
}

impl DenyReason {
    /// Stable machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            DenyReason::InactiveActor => "inactive_actor",
            DenyReason::InsufficientRank => "insufficient_rank",
            DenyReason::OutsideSupervisionScope { .. } => "outside_supervision_scope",
            DenyReason::NotOwned { .. } => "not_owned",
            DenyReason::ReassignmentRequiresHigherRole => "reassignment_requires_higher_role",
            DenyReason::RoleNotPermitted { .. } => "role_not_permitted",
        }
    }
}

impl Display for DenyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::InactiveActor => write!(f, "the actor account is inactive"),
            DenyReason::InsufficientRank => {
                write!(f, "this action is reserved for Super Admin")
            }
            DenyReason::OutsideSupervisionScope { actor, group } => match group {
                Some(g) => write!(
                    f,
                    "group {g} is outside the subnet supervised by user {actor}"
                ),
                None => write!(
                    f,
                    "the target is outside the subnet supervised by user {actor}"
                ),
            },
            DenyReason::NotOwned { actor, group } => match group {
                Some(g) => write!(f, "group {g} is not led by user {actor}"),
                None => write!(f, "the target is not in the group led by user {actor}"),
            },
            DenyReason::ReassignmentRequiresHigherRole => write!(
                f,
                "reassigning a member to another group requires a subnet leader or a global role"
            ),
            DenyReason::RoleNotPermitted { role } => {
                write!(f, "role '{role}' is not permitted to perform this action")
            }
        }
    }
}

/// A structural assignment rule was violated.
///
/// These checks run before any rank-based evaluation and fail regardless
/// of how privileged the caller is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum AssignmentViolation {
    /// The proposed group leader does not hold the GroupLeader role.
    InvalidLeaderRole {
        /// The user proposed as leader.
        user: UserId,
        /// The role that user actually holds.
        role: Role,
    },
    /// The proposed group leader already leads a different group.
    LeaderAlreadyAssigned {
        /// The user proposed as leader.
        user: UserId,
        /// The group that user already leads.
        group: GroupId,
    },
    /// The proposed supervisor does not hold the SubnetLeader role.
    InvalidSubnetLeaderRole {
        /// The user proposed as supervisor.
        user: UserId,
        /// The role that user actually holds.
        role: Role,
    },
}

impl AssignmentViolation {
    /// Stable machine-readable violation code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            AssignmentViolation::InvalidLeaderRole { .. } => "invalid_leader_role",
            AssignmentViolation::LeaderAlreadyAssigned { .. } => "leader_already_assigned",
            AssignmentViolation::InvalidSubnetLeaderRole { .. } => "invalid_subnet_leader_role",
        }
    }
}

impl Display for AssignmentViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentViolation::InvalidLeaderRole { user, role } => write!(
                f,
                "user {user} holds role '{role}' and cannot be assigned as group leader"
            ),
            AssignmentViolation::LeaderAlreadyAssigned { user, group } => {
                write!(f, "user {user} already leads group {group}")
            }
            AssignmentViolation::InvalidSubnetLeaderRole { user, role } => write!(
                f,
                "user {user} holds role '{role}' and cannot be assigned as subnet leader"
            ),
        }
    }
}

/// Failure of the underlying hierarchy store.
///
/// Kept distinct from every deny outcome: an unreachable store aborts the
/// request as an infrastructure failure, it never masquerades as a
/// denial or a missing resource.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or the query failed.
    #[error("hierarchy store unavailable: {0}")]
    Unavailable(String),
}

/// Errors produced by the authorization engine and mutation guard.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthzError {
    /// A referenced entity does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// The kind of entity that was referenced.
        resource: &'static str,
        /// The id that failed to resolve.
        id: i64,
    },

    /// The action was evaluated and denied.
    #[error("access denied: {0}")]
    Denied(DenyReason),

    /// A structural assignment rule was violated.
    #[error("invalid assignment: {0}")]
    InvalidAssignment(AssignmentViolation),

    /// A delete was blocked by dependent rows. The caller must reassign
    /// or clear the dependents first; nothing cascades.
    #[error("cannot delete {resource} {id}: dependent {dependents} still reference it")]
    DependencyConflict {
        /// The kind of entity whose delete was blocked.
        resource: &'static str,
        /// The id of the blocked entity.
        id: i64,
        /// The kind of dependent rows blocking the delete.
        dependents: &'static str,
    },

    /// A uniqueness race or duplicate, reported by the store of record.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The hierarchy store failed; fatal for the current request.
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl AuthzError {
    /// Stable machine-readable error code for API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            AuthzError::NotFound { .. } => "not_found",
            AuthzError::Denied(reason) => reason.code(),
            AuthzError::InvalidAssignment(violation) => violation.code(),
            AuthzError::DependencyConflict { .. } => "dependency_conflict",
            AuthzError::Conflict(_) => "conflict",
            AuthzError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Whether this error is a denial (403-class).
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, AuthzError::Denied(_))
    }
}

/// Convenience Result type for the authorization engine.
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_messages_name_the_ids() {
        let reason = DenyReason::OutsideSupervisionScope {
            actor: UserId::from_i64(10),
            group: Some(GroupId::from_i64(9)),
        };
        let msg = AuthzError::Denied(reason).to_string();
        assert!(msg.contains("group 9"));
        assert!(msg.contains("user 10"));
    }

    #[test]
    fn test_deny_message_for_detached_target() {
        let reason = DenyReason::NotOwned {
            actor: UserId::from_i64(42),
            group: None,
        };
        assert!(reason.to_string().contains("not in the group led by user 42"));
    }

    #[test]
    fn test_assignment_messages() {
        let v = AssignmentViolation::LeaderAlreadyAssigned {
            user: UserId::from_i64(5),
            group: GroupId::from_i64(3),
        };
        let msg = AuthzError::InvalidAssignment(v).to_string();
        assert!(msg.contains("user 5"));
        assert!(msg.contains("group 3"));
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            AuthzError::Denied(DenyReason::InactiveActor).code(),
            "inactive_actor"
        );
        assert_eq!(
            AuthzError::Denied(DenyReason::ReassignmentRequiresHigherRole).code(),
            "reassignment_requires_higher_role"
        );
        assert_eq!(
            AuthzError::NotFound {
                resource: "Miembro",
                id: 1
            }
            .code(),
            "not_found"
        );
        assert_eq!(
            AuthzError::StoreUnavailable(StoreError::Unavailable("down".into())).code(),
            "store_unavailable"
        );
    }

    #[test]
    fn test_store_failure_is_not_a_denial() {
        let err = AuthzError::StoreUnavailable(StoreError::Unavailable("timeout".into()));
        assert!(!err.is_denied());
        assert!(AuthzError::Denied(DenyReason::InsufficientRank).is_denied());
    }

    #[test]
    fn test_dependency_conflict_message() {
        let err = AuthzError::DependencyConflict {
            resource: "Casa de Paz",
            id: 7,
            dependents: "Miembros",
        };
        let msg = err.to_string();
        assert!(msg.contains("Casa de Paz 7"));
        assert!(msg.contains("Miembros"));
    }

    #[test]
    fn test_reason_codes_serialize() {
        let reason = DenyReason::RoleNotPermitted {
            role: casapaz_core::Role::Member,
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert!(json.contains("\"code\":\"role_not_permitted\""));
    }
}
