//! The role model.
//!
//! Roles are immutable reference data stored in the `Roles` table; the
//! numeric ids here match that table and are the values carried inside
//! JWT claims. A role is a capability tag only: whether a user actually
//! leads a group or supervises a subnet is a separately-queried relation,
//! resolved through the hierarchy store on every decision.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A user's role in the organizational hierarchy.
///
/// `SuperAdmin` and `Administration` are "global" roles: visibility and
/// authorization checks that pass for one pass for the other, except for
/// a small reserved action set that is SuperAdmin-only under the default
/// policy (see `casapaz-authz`). The remaining roles are scoped to their
/// structural position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Rol 1: full control over the whole system.
    SuperAdmin,
    /// Rol 2: global administrative staff.
    Administration,
    /// Rol 3: leads a central service, reports service attendance.
    ServiceLeader,
    /// Rol 4 ("LSR"): supervises the groups of a subnet.
    SubnetLeader,
    /// Rol 5 ("Líder"): leads at most one home group.
    GroupLeader,
    /// Rol 6: a plain member account with self-only visibility.
    Member,
}

impl Role {
    /// The numeric role id as stored in `Usuarios.id_rol`.
    #[must_use]
    pub const fn id(self) -> i16 {
        match self {
            Role::SuperAdmin => 1,
            Role::Administration => 2,
            Role::ServiceLeader => 3,
            Role::SubnetLeader => 4,
            Role::GroupLeader => 5,
            Role::Member => 6,
        }
    }

    /// Resolve a role from its stored numeric id.
    #[must_use]
    pub const fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Role::SuperAdmin),
            2 => Some(Role::Administration),
            3 => Some(Role::ServiceLeader),
            4 => Some(Role::SubnetLeader),
            5 => Some(Role::GroupLeader),
            6 => Some(Role::Member),
            _ => None,
        }
    }

    /// Whether this role has organization-wide (unscoped) visibility.
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Administration)
    }

    /// Display name, matching the `Roles.nombre_rol` reference rows.
    #[must_use]
    pub const fn nombre(self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Administration => "Administración",
            Role::ServiceLeader => "Líder de Servicio",
            Role::SubnetLeader => "Líder de Subred",
            Role::GroupLeader => "Líder",
            Role::Member => "Miembro",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.nombre())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ids_roundtrip() {
        for role in [
            Role::SuperAdmin,
            Role::Administration,
            Role::ServiceLeader,
            Role::SubnetLeader,
            Role::GroupLeader,
            Role::Member,
        ] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
    }

    #[test]
    fn test_unknown_id_is_none() {
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(7), None);
        assert_eq!(Role::from_id(-1), None);
    }

    #[test]
    fn test_global_roles() {
        assert!(Role::SuperAdmin.is_global());
        assert!(Role::Administration.is_global());
        assert!(!Role::ServiceLeader.is_global());
        assert!(!Role::SubnetLeader.is_global());
        assert!(!Role::GroupLeader.is_global());
        assert!(!Role::Member.is_global());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::SubnetLeader).unwrap();
        assert_eq!(json, "\"subnet_leader\"");
        let back: Role = serde_json::from_str("\"group_leader\"").unwrap();
        assert_eq!(back, Role::GroupLeader);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Role::SubnetLeader.to_string(), "Líder de Subred");
        assert_eq!(Role::GroupLeader.to_string(), "Líder");
    }
}
