//! Mutation guard: lifecycle and dependency invariants.
//!
//! These helpers are pure; the services supply the current state and the
//! dependent-row counts, the guard says what may happen. The relational
//! store remains the authority of record for uniqueness races — these
//! pre-checks exist to give callers precise errors, not to replace the
//! constraints.

use crate::error::{AuthzError, Result};

/// Lifecycle state of a member, as stored in `Miembros.estado`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLifecycle {
    Active,
    Inactive,
}

impl MemberLifecycle {
    /// Parse the stored representation.
    #[must_use]
    pub fn from_estado(estado: &str) -> Option<Self> {
        match estado {
            "Activo" => Some(MemberLifecycle::Active),
            "Inactivo" => Some(MemberLifecycle::Inactive),
            _ => None,
        }
    }

    /// The stored representation.
    #[must_use]
    pub const fn as_estado(self) -> &'static str {
        match self {
            MemberLifecycle::Active => "Activo",
            MemberLifecycle::Inactive => "Inactivo",
        }
    }
}

/// The outcome of planning a member deactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deactivation {
    /// The member is active; write `Inactivo`.
    Apply,
    /// The member is already inactive; succeed without touching the row.
    AlreadyInactive,
}

/// Plan a soft delete. Deactivating an already-inactive member is a
/// repeatable success, not an error and not a second write.
#[must_use]
pub fn plan_deactivation(current: MemberLifecycle) -> Deactivation {
    match current {
        MemberLifecycle::Active => Deactivation::Apply,
        MemberLifecycle::Inactive => Deactivation::AlreadyInactive,
    }
}

/// Reject a hard delete while dependent rows still reference the target.
///
/// Nothing cascades: the caller must reassign or clear the dependents
/// first and retry.
pub fn ensure_no_dependents(
    resource: &'static str,
    id: i64,
    dependents: &'static str,
    count: i64,
) -> Result<()> {
    if count > 0 {
        return Err(AuthzError::DependencyConflict {
            resource,
            id,
            dependents,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estado_roundtrip() {
        assert_eq!(
            MemberLifecycle::from_estado("Activo"),
            Some(MemberLifecycle::Active)
        );
        assert_eq!(
            MemberLifecycle::from_estado("Inactivo"),
            Some(MemberLifecycle::Inactive)
        );
        assert_eq!(MemberLifecycle::from_estado("???"), None);
        assert_eq!(MemberLifecycle::Active.as_estado(), "Activo");
    }

    #[test]
    fn test_deactivation_is_idempotent() {
        assert_eq!(
            plan_deactivation(MemberLifecycle::Active),
            Deactivation::Apply
        );
        // Second deactivation succeeds with no write.
        assert_eq!(
            plan_deactivation(MemberLifecycle::Inactive),
            Deactivation::AlreadyInactive
        );
    }

    #[test]
    fn test_dependents_block_deletion() {
        let err = ensure_no_dependents("Casa de Paz", 7, "Miembros", 3).unwrap_err();
        assert_eq!(err.code(), "dependency_conflict");
        assert!(err.to_string().contains("Casa de Paz 7"));

        // After the dependents are cleared, the same delete may proceed.
        ensure_no_dependents("Casa de Paz", 7, "Miembros", 0).unwrap();
    }
}
