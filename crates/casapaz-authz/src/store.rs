//! The hierarchy resolver seam.
//!
//! [`HierarchyStore`] is the read-only capability the engine uses to
//! resolve structural positions: which group a user leads, which groups a
//! subnet leader supervises, and the ownership chain of any scoped
//! resource. Every call is a point-in-time snapshot query against the
//! external store — results must not be cached between decisions, since
//! assignments can change between requests. Callers needing atomicity
//! wrap the whole authorize-then-mutate sequence in one transaction.
//!
//! [`InMemoryHierarchyStore`] is a deterministic implementation for
//! tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use casapaz_core::{FollowUpId, GroupId, MemberId, ReportId, Role, UserId, VisitId};

use crate::chain::{Chain, MemberChain};
use crate::error::StoreError;

/// A lightweight reference to a group, as returned by leader lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    /// The group id.
    pub group_id: GroupId,
    /// The group's display name (`nombre_lider_cdp`).
    pub nombre: String,
}

/// A user account as the engine needs to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// The account's role tag.
    pub role: Role,
    /// Whether the account is active.
    pub active: bool,
    /// The account's display name.
    pub nombre: String,
}

/// Read-only snapshot queries against the hierarchy of record.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// The single group led by `user_id`, if any. A group leader leads at
    /// most one group; absence means "no group assigned", not an error.
    async fn group_led_by(&self, user_id: UserId) -> Result<Option<GroupRef>, StoreError>;

    /// All groups whose supervising subnet leader is `user_id`.
    async fn groups_supervised_by(&self, user_id: UserId) -> Result<Vec<GroupId>, StoreError>;

    /// The full ownership chain of a group, or `None` if the group does
    /// not exist.
    async fn group_chain(&self, group_id: GroupId) -> Result<Option<Chain>, StoreError>;

    /// The ownership chain of a member, or `None` if the member does not
    /// exist. An existing member without a group yields a record whose
    /// `group` is `None`.
    async fn member_chain(&self, member_id: MemberId) -> Result<Option<MemberChain>, StoreError>;

    /// The ownership chain of a weekly report, resolved through the
    /// reporting leader's group.
    async fn report_chain(&self, report_id: ReportId) -> Result<Option<Chain>, StoreError>;

    /// The ownership chain of a guest visit, resolved through its report.
    async fn visit_chain(&self, visit_id: VisitId) -> Result<Option<Chain>, StoreError>;

    /// The ownership chain of a follow-up, resolved through its visit.
    async fn follow_up_chain(&self, follow_up_id: FollowUpId)
        -> Result<Option<Chain>, StoreError>;

    /// The role and activity state of a user account.
    async fn user_account(&self, user_id: UserId) -> Result<Option<UserAccount>, StoreError>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    users: HashMap<UserId, UserAccount>,
    groups: HashMap<GroupId, (String, Chain)>,
    members: HashMap<MemberId, Option<GroupId>>,
    reports: HashMap<ReportId, GroupId>,
    visits: HashMap<VisitId, ReportId>,
    follow_ups: HashMap<FollowUpId, VisitId>,
}

/// In-memory hierarchy store for tests.
#[derive(Debug, Default)]
pub struct InMemoryHierarchyStore {
    state: RwLock<InMemoryState>,
}

impl InMemoryHierarchyStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user account.
    pub fn add_user(&self, id: UserId, role: Role, active: bool, nombre: &str) {
        self.state.write().unwrap().users.insert(
            id,
            UserAccount {
                role,
                active,
                nombre: nombre.to_string(),
            },
        );
    }

    /// Register a group with its ownership chain.
    pub fn add_group(&self, nombre: &str, chain: Chain) {
        self.state
            .write()
            .unwrap()
            .groups
            .insert(chain.group_id, (nombre.to_string(), chain));
    }

    /// Register a member, optionally assigned to a group.
    pub fn add_member(&self, id: MemberId, group: Option<GroupId>) {
        self.state.write().unwrap().members.insert(id, group);
    }

    /// Register a report owned by the leader of `group`.
    pub fn add_report(&self, id: ReportId, group: GroupId) {
        self.state.write().unwrap().reports.insert(id, group);
    }

    /// Register a visit belonging to `report`.
    pub fn add_visit(&self, id: VisitId, report: ReportId) {
        self.state.write().unwrap().visits.insert(id, report);
    }

    /// Register a follow-up originating from `visit`.
    pub fn add_follow_up(&self, id: FollowUpId, visit: VisitId) {
        self.state.write().unwrap().follow_ups.insert(id, visit);
    }

    /// Reassign a member to a different group (or detach it).
    pub fn move_member(&self, id: MemberId, group: Option<GroupId>) {
        self.state.write().unwrap().members.insert(id, group);
    }
}

#[async_trait]
impl HierarchyStore for InMemoryHierarchyStore {
    async fn group_led_by(&self, user_id: UserId) -> Result<Option<GroupRef>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .groups
            .values()
            .find(|(_, chain)| chain.leader_id == Some(user_id))
            .map(|(nombre, chain)| GroupRef {
                group_id: chain.group_id,
                nombre: nombre.clone(),
            }))
    }

    async fn groups_supervised_by(&self, user_id: UserId) -> Result<Vec<GroupId>, StoreError> {
        let state = self.state.read().unwrap();
        let mut groups: Vec<GroupId> = state
            .groups
            .values()
            .filter(|(_, chain)| chain.subnet_leader_id == Some(user_id))
            .map(|(_, chain)| chain.group_id)
            .collect();
        groups.sort();
        Ok(groups)
    }

    async fn group_chain(&self, group_id: GroupId) -> Result<Option<Chain>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state.groups.get(&group_id).map(|(_, chain)| chain.clone()))
    }

    async fn member_chain(&self, member_id: MemberId) -> Result<Option<MemberChain>, StoreError> {
        let state = self.state.read().unwrap();
        let Some(group) = state.members.get(&member_id) else {
            return Ok(None);
        };
        let group = group.and_then(|g| state.groups.get(&g).map(|(_, chain)| chain.clone()));
        Ok(Some(MemberChain {
            member_id,
            group,
        }))
    }

    async fn report_chain(&self, report_id: ReportId) -> Result<Option<Chain>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .reports
            .get(&report_id)
            .and_then(|g| state.groups.get(g))
            .map(|(_, chain)| chain.clone()))
    }

    async fn visit_chain(&self, visit_id: VisitId) -> Result<Option<Chain>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .visits
            .get(&visit_id)
            .and_then(|r| state.reports.get(r))
            .and_then(|g| state.groups.get(g))
            .map(|(_, chain)| chain.clone()))
    }

    async fn follow_up_chain(
        &self,
        follow_up_id: FollowUpId,
    ) -> Result<Option<Chain>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .follow_ups
            .get(&follow_up_id)
            .and_then(|v| state.visits.get(v))
            .and_then(|r| state.reports.get(r))
            .and_then(|g| state.groups.get(g))
            .map(|(_, chain)| chain.clone()))
    }

    async fn user_account(&self, user_id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state.users.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casapaz_core::NetworkId;

    fn sample_chain(group: i64, leader: i64, lsr: i64) -> Chain {
        Chain {
            group_id: GroupId::from_i64(group),
            leader_id: Some(UserId::from_i64(leader)),
            subnet_leader_id: Some(UserId::from_i64(lsr)),
            network_id: NetworkId::from_i64(1),
        }
    }

    #[tokio::test]
    async fn test_group_led_by_finds_single_group() {
        let store = InMemoryHierarchyStore::new();
        store.add_group("CdP Ana", sample_chain(7, 42, 10));

        let found = store
            .group_led_by(UserId::from_i64(42))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.group_id, GroupId::from_i64(7));
        assert_eq!(found.nombre, "CdP Ana");

        assert!(store
            .group_led_by(UserId::from_i64(99))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_groups_supervised_by() {
        let store = InMemoryHierarchyStore::new();
        store.add_group("CdP A", sample_chain(7, 42, 10));
        store.add_group("CdP B", sample_chain(8, 43, 10));
        store.add_group("CdP C", sample_chain(9, 44, 11));

        let supervised = store
            .groups_supervised_by(UserId::from_i64(10))
            .await
            .unwrap();
        assert_eq!(
            supervised,
            vec![GroupId::from_i64(7), GroupId::from_i64(8)]
        );
    }

    #[tokio::test]
    async fn test_member_chain_distinguishes_missing_from_detached() {
        let store = InMemoryHierarchyStore::new();
        store.add_group("CdP A", sample_chain(7, 42, 10));
        store.add_member(MemberId::from_i64(1), Some(GroupId::from_i64(7)));
        store.add_member(MemberId::from_i64(2), None);

        let assigned = store
            .member_chain(MemberId::from_i64(1))
            .await
            .unwrap()
            .unwrap();
        assert!(assigned.group.is_some());

        let detached = store
            .member_chain(MemberId::from_i64(2))
            .await
            .unwrap()
            .unwrap();
        assert!(detached.group.is_none());

        assert!(store
            .member_chain(MemberId::from_i64(3))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_follow_up_chain_walks_the_whole_path() {
        let store = InMemoryHierarchyStore::new();
        store.add_group("CdP A", sample_chain(7, 42, 10));
        store.add_report(ReportId::from_i64(100), GroupId::from_i64(7));
        store.add_visit(VisitId::from_i64(200), ReportId::from_i64(100));
        store.add_follow_up(FollowUpId::from_i64(300), VisitId::from_i64(200));

        let chain = store
            .follow_up_chain(FollowUpId::from_i64(300))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chain.group_id, GroupId::from_i64(7));
        assert!(chain.is_supervised_by(UserId::from_i64(10)));
    }
}
