//! The authorization engine.
//!
//! One decision table replaces the near-identical permission blocks the
//! original spread across its controllers. Evaluation order, first match
//! wins:
//!
//! 1. an inactive actor is denied outright;
//! 2. the target is resolved through the hierarchy store — a dangling
//!    reference fails with `NotFound` before any rank is considered;
//! 3. global roles pass, except the Super-Admin-reserved actions when
//!    the policy keeps Administration out of them;
//! 4. a subnet leader passes iff the target's chain is supervised by
//!    them and the action is in the supervisor set;
//! 5. a group leader passes iff the target's chain is led by them and
//!    the action is in the leader set;
//! 6. everything else is denied.
//!
//! Structural assignment checks ([`AuthorizationEngine::check_leader_assignable`],
//! [`AuthorizationEngine::check_subnet_leader_assignable`]) run before
//! rank-based evaluation at their call sites and fail regardless of how
//! privileged the caller is.
//!
//! The engine holds no state beyond the store handle and the policy; it
//! re-resolves the hierarchy on every call so decisions always reflect
//! the current assignments.

use casapaz_core::{FollowUpId, GroupId, MemberId, ReportId, Role, UserId, VisitId};

use crate::action::Action;
use crate::actor::Actor;
use crate::chain::Chain;
use crate::error::{AssignmentViolation, AuthzError, DenyReason, Result};
use crate::policy::AuthzPolicy;
use crate::store::HierarchyStore;

/// What an action is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// No single resource — listings and creations scoped elsewhere.
    Global,
    /// A home group.
    Group(GroupId),
    /// A member.
    Member(MemberId),
    /// A weekly group report.
    Report(ReportId),
    /// A guest visit.
    Visit(VisitId),
    /// A follow-up record.
    FollowUp(FollowUpId),
    /// A chain the caller already resolved (e.g. inside a transaction).
    Chain(Chain),
}

/// The target after resolution against the store.
enum ResolvedTarget {
    /// No chain applies (global-target actions).
    Unscoped,
    /// The target exists but is not attached to any group.
    Detached,
    /// The target's ownership chain.
    Scoped(Chain),
}

/// The consolidated authorization engine.
pub struct AuthorizationEngine<S> {
    store: S,
    policy: AuthzPolicy,
}

impl<S: HierarchyStore> AuthorizationEngine<S> {
    /// Create an engine over a hierarchy store with the given policy.
    pub fn new(store: S, policy: AuthzPolicy) -> Self {
        Self { store, policy }
    }

    /// The underlying hierarchy store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> &AuthzPolicy {
        &self.policy
    }

    /// Decide whether `actor` may perform `action` on `target`.
    ///
    /// Returns `Ok(())` on ALLOW. Every DENY carries its reason; a
    /// missing target is `NotFound`; a store failure is
    /// `StoreUnavailable` and aborts the request.
    pub async fn authorize(&self, actor: &Actor, action: Action, target: &Target) -> Result<()> {
        if !actor.active {
            return self.deny(actor, action, DenyReason::InactiveActor);
        }

        let resolved = self.resolve_target(target).await?;

        match actor.role {
            Role::SuperAdmin => Ok(()),
            Role::Administration => {
                if action.reserved_for_super_admin()
                    && !self.policy.administration_has_global_rights
                {
                    self.deny(actor, action, DenyReason::InsufficientRank)
                } else {
                    Ok(())
                }
            }
            Role::SubnetLeader => {
                if !action.permitted_to_subnet_leader() {
                    return self.deny(
                        actor,
                        action,
                        DenyReason::RoleNotPermitted { role: actor.role },
                    );
                }
                match resolved {
                    ResolvedTarget::Unscoped => Ok(()),
                    ResolvedTarget::Detached => self.deny(
                        actor,
                        action,
                        DenyReason::OutsideSupervisionScope {
                            actor: actor.id,
                            group: None,
                        },
                    ),
                    ResolvedTarget::Scoped(chain) => {
                        if chain.is_supervised_by(actor.id) {
                            Ok(())
                        } else {
                            self.deny(
                                actor,
                                action,
                                DenyReason::OutsideSupervisionScope {
                                    actor: actor.id,
                                    group: Some(chain.group_id),
                                },
                            )
                        }
                    }
                }
            }
            Role::GroupLeader => {
                if action == Action::MemberReassign {
                    return self.deny(actor, action, DenyReason::ReassignmentRequiresHigherRole);
                }
                if !action.permitted_to_group_leader() {
                    return self.deny(
                        actor,
                        action,
                        DenyReason::RoleNotPermitted { role: actor.role },
                    );
                }
                match resolved {
                    ResolvedTarget::Unscoped => Ok(()),
                    ResolvedTarget::Detached => self.deny(
                        actor,
                        action,
                        DenyReason::NotOwned {
                            actor: actor.id,
                            group: None,
                        },
                    ),
                    ResolvedTarget::Scoped(chain) => {
                        if chain.is_led_by(actor.id) {
                            Ok(())
                        } else {
                            self.deny(
                                actor,
                                action,
                                DenyReason::NotOwned {
                                    actor: actor.id,
                                    group: Some(chain.group_id),
                                },
                            )
                        }
                    }
                }
            }
            Role::ServiceLeader => {
                if action == Action::ServiceReportCreate {
                    Ok(())
                } else {
                    self.deny(
                        actor,
                        action,
                        DenyReason::RoleNotPermitted { role: actor.role },
                    )
                }
            }
            Role::Member => self.deny(
                actor,
                action,
                DenyReason::RoleNotPermitted { role: actor.role },
            ),
        }
    }

    /// Decide whether `actor` may move `member` into `destination`.
    ///
    /// Reassignment is stricter than an ordinary member update: the
    /// member's own leader is always denied, and a subnet leader must
    /// supervise both the source and the destination group.
    pub async fn authorize_reassignment(
        &self,
        actor: &Actor,
        member: MemberId,
        destination: GroupId,
    ) -> Result<()> {
        if !actor.active {
            return self.deny(actor, Action::MemberReassign, DenyReason::InactiveActor);
        }

        let source = self
            .store
            .member_chain(member)
            .await?
            .ok_or(AuthzError::NotFound {
                resource: "Miembro",
                id: member.as_i64(),
            })?;
        let dest = self
            .store
            .group_chain(destination)
            .await?
            .ok_or(AuthzError::NotFound {
                resource: "Casa de Paz",
                id: destination.as_i64(),
            })?;

        match actor.role {
            Role::SuperAdmin | Role::Administration => Ok(()),
            Role::SubnetLeader => {
                let source_ok = source
                    .group
                    .as_ref()
                    .is_some_and(|c| c.is_supervised_by(actor.id));
                if !source_ok {
                    return self.deny(
                        actor,
                        Action::MemberReassign,
                        DenyReason::OutsideSupervisionScope {
                            actor: actor.id,
                            group: source.group.as_ref().map(|c| c.group_id),
                        },
                    );
                }
                if !dest.is_supervised_by(actor.id) {
                    return self.deny(
                        actor,
                        Action::MemberReassign,
                        DenyReason::OutsideSupervisionScope {
                            actor: actor.id,
                            group: Some(dest.group_id),
                        },
                    );
                }
                Ok(())
            }
            Role::GroupLeader => self.deny(
                actor,
                Action::MemberReassign,
                DenyReason::ReassignmentRequiresHigherRole,
            ),
            _ => self.deny(
                actor,
                Action::MemberReassign,
                DenyReason::RoleNotPermitted { role: actor.role },
            ),
        }
    }

    /// Verify that `user` can be assigned as the leader of `group`.
    ///
    /// Fails with `InvalidLeaderRole` when the user does not hold the
    /// GroupLeader role, and with `LeaderAlreadyAssigned` when the user
    /// already leads a different group. Passing the group being edited
    /// makes re-confirming the current leader a no-op.
    pub async fn check_leader_assignable(
        &self,
        user: UserId,
        group: Option<GroupId>,
    ) -> Result<()> {
        let account = self
            .store
            .user_account(user)
            .await?
            .ok_or(AuthzError::NotFound {
                resource: "Usuario",
                id: user.as_i64(),
            })?;

        if account.role != Role::GroupLeader {
            return Err(AuthzError::InvalidAssignment(
                AssignmentViolation::InvalidLeaderRole {
                    user,
                    role: account.role,
                },
            ));
        }

        if let Some(existing) = self.store.group_led_by(user).await? {
            if group != Some(existing.group_id) {
                return Err(AuthzError::InvalidAssignment(
                    AssignmentViolation::LeaderAlreadyAssigned {
                        user,
                        group: existing.group_id,
                    },
                ));
            }
        }

        Ok(())
    }

    /// Verify that `user` can be assigned as a subnet supervisor.
    pub async fn check_subnet_leader_assignable(&self, user: UserId) -> Result<()> {
        let account = self
            .store
            .user_account(user)
            .await?
            .ok_or(AuthzError::NotFound {
                resource: "Usuario",
                id: user.as_i64(),
            })?;

        if account.role != Role::SubnetLeader {
            return Err(AuthzError::InvalidAssignment(
                AssignmentViolation::InvalidSubnetLeaderRole {
                    user,
                    role: account.role,
                },
            ));
        }

        Ok(())
    }

    async fn resolve_target(&self, target: &Target) -> Result<ResolvedTarget> {
        let chain = match target {
            Target::Global => return Ok(ResolvedTarget::Unscoped),
            Target::Chain(chain) => return Ok(ResolvedTarget::Scoped(chain.clone())),
            Target::Group(id) => {
                self.store
                    .group_chain(*id)
                    .await?
                    .ok_or(AuthzError::NotFound {
                        resource: "Casa de Paz",
                        id: id.as_i64(),
                    })?
            }
            Target::Member(id) => {
                let member = self
                    .store
                    .member_chain(*id)
                    .await?
                    .ok_or(AuthzError::NotFound {
                        resource: "Miembro",
                        id: id.as_i64(),
                    })?;
                match member.group {
                    Some(chain) => chain,
                    None => return Ok(ResolvedTarget::Detached),
                }
            }
            Target::Report(id) => {
                self.store
                    .report_chain(*id)
                    .await?
                    .ok_or(AuthzError::NotFound {
                        resource: "Reporte",
                        id: id.as_i64(),
                    })?
            }
            Target::Visit(id) => {
                self.store
                    .visit_chain(*id)
                    .await?
                    .ok_or(AuthzError::NotFound {
                        resource: "Visita",
                        id: id.as_i64(),
                    })?
            }
            Target::FollowUp(id) => {
                self.store
                    .follow_up_chain(*id)
                    .await?
                    .ok_or(AuthzError::NotFound {
                        resource: "Seguimiento",
                        id: id.as_i64(),
                    })?
            }
        };
        Ok(ResolvedTarget::Scoped(chain))
    }

    fn deny(&self, actor: &Actor, action: Action, reason: DenyReason) -> Result<()> {
        tracing::debug!(
            target: "authz",
            actor_id = %actor.id,
            actor_role = ?actor.role,
            action = ?action,
            reason = reason.code(),
            "Access denied"
        );
        Err(AuthzError::Denied(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryHierarchyStore;
    use casapaz_core::NetworkId;

    /// Two subnets: LSR 10 supervises groups 7 (leader 42) and 8
    /// (leader 43); LSR 11 supervises group 9 (leader 44). Member 1 is
    /// in group 7, member 2 in group 9, member 3 unassigned.
    fn fixture() -> AuthorizationEngine<InMemoryHierarchyStore> {
        let store = InMemoryHierarchyStore::new();
        store.add_user(UserId::from_i64(1), Role::SuperAdmin, true, "Root");
        store.add_user(UserId::from_i64(2), Role::Administration, true, "Marta");
        store.add_user(UserId::from_i64(10), Role::SubnetLeader, true, "Pedro");
        store.add_user(UserId::from_i64(11), Role::SubnetLeader, true, "Lucía");
        store.add_user(UserId::from_i64(42), Role::GroupLeader, true, "Ana");
        store.add_user(UserId::from_i64(43), Role::GroupLeader, true, "Luis");
        store.add_user(UserId::from_i64(44), Role::GroupLeader, true, "Sofía");
        store.add_user(UserId::from_i64(60), Role::Member, true, "Juan");

        for (group, leader, lsr) in [(7, 42, 10), (8, 43, 10), (9, 44, 11)] {
            store.add_group(
                &format!("CdP {group}"),
                Chain {
                    group_id: GroupId::from_i64(group),
                    leader_id: Some(UserId::from_i64(leader)),
                    subnet_leader_id: Some(UserId::from_i64(lsr)),
                    network_id: NetworkId::from_i64(1),
                },
            );
        }
        store.add_member(MemberId::from_i64(1), Some(GroupId::from_i64(7)));
        store.add_member(MemberId::from_i64(2), Some(GroupId::from_i64(9)));
        store.add_member(MemberId::from_i64(3), None);
        store.add_report(ReportId::from_i64(100), GroupId::from_i64(7));
        store.add_visit(VisitId::from_i64(200), ReportId::from_i64(100));
        store.add_follow_up(FollowUpId::from_i64(300), VisitId::from_i64(200));

        AuthorizationEngine::new(store, AuthzPolicy::default())
    }

    fn actor(id: i64, role: Role) -> Actor {
        Actor::new(UserId::from_i64(id), role)
    }

    fn denied(result: Result<()>) -> DenyReason {
        match result {
            Err(AuthzError::Denied(reason)) => reason,
            other => panic!("expected a denial, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_super_admin_allows_everything() {
        let engine = fixture();
        let root = actor(1, Role::SuperAdmin);
        for action in [
            Action::UserCreate,
            Action::NetworkDelete,
            Action::GroupDelete,
            Action::MemberHardDelete,
            Action::MemberReassign,
        ] {
            engine
                .authorize(&root, action, &Target::Member(MemberId::from_i64(1)))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_administration_blocked_from_reserved_set_by_default() {
        let engine = fixture();
        let admin = actor(2, Role::Administration);

        let reason = denied(
            engine
                .authorize(&admin, Action::UserCreate, &Target::Global)
                .await,
        );
        assert_eq!(reason, DenyReason::InsufficientRank);

        // Non-reserved global action still passes.
        engine
            .authorize(&admin, Action::GroupDelete, &Target::Group(GroupId::from_i64(7)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_administration_gains_reserved_set_with_policy() {
        let store = InMemoryHierarchyStore::new();
        let engine = AuthorizationEngine::new(store, AuthzPolicy::administration_global());
        let admin = actor(2, Role::Administration);

        engine
            .authorize(&admin, Action::UserCreate, &Target::Global)
            .await
            .unwrap();
        engine
            .authorize(&admin, Action::NetworkUpdate, &Target::Global)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_subnet_leader_scope_matches_chain() {
        let engine = fixture();
        let pedro = actor(10, Role::SubnetLeader);

        // Supervised groups pass for any group-scoped action in the set.
        for group in [7, 8] {
            engine
                .authorize(
                    &pedro,
                    Action::MemberUpdate,
                    &Target::Group(GroupId::from_i64(group)),
                )
                .await
                .unwrap();
        }

        // Group 9 belongs to LSR 11.
        let reason = denied(
            engine
                .authorize(
                    &pedro,
                    Action::MemberUpdate,
                    &Target::Member(MemberId::from_i64(2)),
                )
                .await,
        );
        assert_eq!(
            reason,
            DenyReason::OutsideSupervisionScope {
                actor: UserId::from_i64(10),
                group: Some(GroupId::from_i64(9)),
            }
        );
    }

    #[tokio::test]
    async fn test_detached_member_is_global_only() {
        let engine = fixture();

        let pedro = actor(10, Role::SubnetLeader);
        let reason = denied(
            engine
                .authorize(
                    &pedro,
                    Action::MemberRead,
                    &Target::Member(MemberId::from_i64(3)),
                )
                .await,
        );
        assert_eq!(reason.code(), "outside_supervision_scope");

        let admin = actor(2, Role::Administration);
        engine
            .authorize(
                &admin,
                Action::MemberRead,
                &Target::Member(MemberId::from_i64(3)),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_group_leader_owns_only_their_group() {
        let engine = fixture();
        let ana = actor(42, Role::GroupLeader);

        engine
            .authorize(
                &ana,
                Action::MemberCreate,
                &Target::Group(GroupId::from_i64(7)),
            )
            .await
            .unwrap();
        engine
            .authorize(
                &ana,
                Action::FollowUpAddNote,
                &Target::FollowUp(FollowUpId::from_i64(300)),
            )
            .await
            .unwrap();

        let reason = denied(
            engine
                .authorize(
                    &ana,
                    Action::MemberCreate,
                    &Target::Group(GroupId::from_i64(8)),
                )
                .await,
        );
        assert_eq!(
            reason,
            DenyReason::NotOwned {
                actor: UserId::from_i64(42),
                group: Some(GroupId::from_i64(8)),
            }
        );
    }

    #[tokio::test]
    async fn test_group_leader_cannot_do_global_actions() {
        let engine = fixture();
        let ana = actor(42, Role::GroupLeader);

        let reason = denied(
            engine
                .authorize(
                    &ana,
                    Action::MemberHardDelete,
                    &Target::Member(MemberId::from_i64(1)),
                )
                .await,
        );
        assert_eq!(reason.code(), "role_not_permitted");
    }

    #[tokio::test]
    async fn test_reassignment_denied_for_owner_leader() {
        let engine = fixture();
        let ana = actor(42, Role::GroupLeader);

        // Even though member 1 is in Ana's own group.
        let reason = denied(
            engine
                .authorize_reassignment(&ana, MemberId::from_i64(1), GroupId::from_i64(8))
                .await,
        );
        assert_eq!(reason, DenyReason::ReassignmentRequiresHigherRole);

        // The plain-action route is blocked the same way.
        let reason = denied(
            engine
                .authorize(
                    &ana,
                    Action::MemberReassign,
                    &Target::Member(MemberId::from_i64(1)),
                )
                .await,
        );
        assert_eq!(reason, DenyReason::ReassignmentRequiresHigherRole);
    }

    #[tokio::test]
    async fn test_reassignment_requires_both_sides_in_subnet() {
        let engine = fixture();
        let pedro = actor(10, Role::SubnetLeader);

        // Within the subnet: group 7 -> group 8.
        engine
            .authorize_reassignment(&pedro, MemberId::from_i64(1), GroupId::from_i64(8))
            .await
            .unwrap();

        // Destination outside the subnet.
        let reason = denied(
            engine
                .authorize_reassignment(&pedro, MemberId::from_i64(1), GroupId::from_i64(9))
                .await,
        );
        assert_eq!(
            reason,
            DenyReason::OutsideSupervisionScope {
                actor: UserId::from_i64(10),
                group: Some(GroupId::from_i64(9)),
            }
        );

        // Source outside the subnet.
        let reason = denied(
            engine
                .authorize_reassignment(&pedro, MemberId::from_i64(2), GroupId::from_i64(7))
                .await,
        );
        assert_eq!(reason.code(), "outside_supervision_scope");

        // Global roles move members freely.
        let admin = actor(2, Role::Administration);
        engine
            .authorize_reassignment(&admin, MemberId::from_i64(2), GroupId::from_i64(7))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_leader_already_assigned_regardless_of_caller_rank() {
        let engine = fixture();

        // User 42 already leads group 7; assigning them to group 8 fails
        // structurally, before any rank is consulted.
        let err = engine
            .check_leader_assignable(UserId::from_i64(42), Some(GroupId::from_i64(8)))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthzError::InvalidAssignment(AssignmentViolation::LeaderAlreadyAssigned {
                user: UserId::from_i64(42),
                group: GroupId::from_i64(7),
            })
        );

        // Re-confirming the current assignment is fine.
        engine
            .check_leader_assignable(UserId::from_i64(42), Some(GroupId::from_i64(7)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_assignment_role_checks() {
        let engine = fixture();

        // A member account cannot lead a group.
        let err = engine
            .check_leader_assignable(UserId::from_i64(60), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_leader_role");

        // A group leader cannot supervise a subnet.
        let err = engine
            .check_subnet_leader_assignable(UserId::from_i64(42))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_subnet_leader_role");

        // An unknown user is NotFound, not a violation.
        let err = engine
            .check_leader_assignable(UserId::from_i64(999), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found_before_rank() {
        let engine = fixture();

        // Even the Super Admin gets NotFound for a dangling reference.
        let err = engine
            .authorize(
                &actor(1, Role::SuperAdmin),
                Action::MemberRead,
                &Target::Member(MemberId::from_i64(999)),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthzError::NotFound {
                resource: "Miembro",
                id: 999,
            }
        );
    }

    #[tokio::test]
    async fn test_inactive_actor_denied_before_anything_else() {
        let engine = fixture();
        let inactive = actor(1, Role::SuperAdmin).deactivated();

        // Even a missing target reports InactiveActor, not NotFound.
        let reason = denied(
            engine
                .authorize(
                    &inactive,
                    Action::MemberRead,
                    &Target::Member(MemberId::from_i64(999)),
                )
                .await,
        );
        assert_eq!(reason, DenyReason::InactiveActor);
    }

    #[tokio::test]
    async fn test_member_role_never_passes() {
        let engine = fixture();
        let juan = actor(60, Role::Member);

        let reason = denied(
            engine
                .authorize(
                    &juan,
                    Action::MemberList,
                    &Target::Global,
                )
                .await,
        );
        assert_eq!(
            reason,
            DenyReason::RoleNotPermitted { role: Role::Member }
        );
    }

    #[tokio::test]
    async fn test_service_leader_only_creates_service_reports() {
        let store = InMemoryHierarchyStore::new();
        let engine = AuthorizationEngine::new(store, AuthzPolicy::default());
        let servant = actor(70, Role::ServiceLeader);

        engine
            .authorize(&servant, Action::ServiceReportCreate, &Target::Global)
            .await
            .unwrap();

        let reason = denied(
            engine
                .authorize(&servant, Action::ReportCreate, &Target::Global)
                .await,
        );
        assert_eq!(reason.code(), "role_not_permitted");
    }

    #[tokio::test]
    async fn test_report_and_visit_targets_resolve_through_their_chain() {
        let engine = fixture();
        let pedro = actor(10, Role::SubnetLeader);
        let lucia = actor(11, Role::SubnetLeader);

        engine
            .authorize(
                &pedro,
                Action::ReportRead,
                &Target::Report(ReportId::from_i64(100)),
            )
            .await
            .unwrap();
        engine
            .authorize(
                &pedro,
                Action::FollowUpStart,
                &Target::Visit(VisitId::from_i64(200)),
            )
            .await
            .unwrap();

        let reason = denied(
            engine
                .authorize(
                    &lucia,
                    Action::ReportRead,
                    &Target::Report(ReportId::from_i64(100)),
                )
                .await,
        );
        assert_eq!(reason.code(), "outside_supervision_scope");
    }
}
