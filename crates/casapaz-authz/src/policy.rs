//! Deployment-level authorization policy.

/// Tunable policy knobs for the authorization engine.
///
/// The original system was inconsistent about whether the Administration
/// role shares the rights reserved for Super Admin (user management and
/// network management): some routes admitted both, others only rol 1.
/// Rather than bake in one reading, the choice is an explicit deployment
/// option. The default is `false` — the strict variant — so Administration
/// is denied the reserved actions with `InsufficientRank` unless the
/// operator opts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthzPolicy {
    /// When `true`, Administration holds every right Super Admin holds,
    /// including user and network management.
    pub administration_has_global_rights: bool,
}

impl Default for AuthzPolicy {
    fn default() -> Self {
        Self {
            administration_has_global_rights: false,
        }
    }
}

impl AuthzPolicy {
    /// The strict default policy.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Policy granting Administration the full Super Admin right set.
    #[must_use]
    pub fn administration_global() -> Self {
        Self {
            administration_has_global_rights: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        assert!(!AuthzPolicy::default().administration_has_global_rights);
        assert_eq!(AuthzPolicy::default(), AuthzPolicy::strict());
    }

    #[test]
    fn test_administration_global() {
        assert!(AuthzPolicy::administration_global().administration_has_global_rights);
    }
}
