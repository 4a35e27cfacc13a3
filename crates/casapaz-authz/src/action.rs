//! The catalog of guarded operations.
//!
//! Every mutation and scoped read in the system maps to one variant
//! here; the engine's decision table keys off these. The per-role
//! permission sets consolidate what the original controllers repeated
//! inline, route by route.

use serde::Serialize;

/// An operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // User administration (reserved for Super Admin under the strict policy)
    UserList,
    UserCreate,
    UserUpdate,
    UserDeactivate,

    // Network management (reserved for Super Admin under the strict policy)
    NetworkList,
    NetworkCreate,
    NetworkUpdate,
    NetworkDelete,

    // Home group management (global roles)
    GroupList,
    GroupRead,
    GroupCreate,
    GroupUpdate,
    GroupDelete,
    GroupAssignLeader,

    // Members
    MemberList,
    MemberRead,
    MemberCreate,
    MemberUpdate,
    MemberDeactivate,
    MemberHardDelete,
    MemberReassign,
    MemberPhaseUpdate,

    // Weekly group reports and their children
    ReportList,
    ReportRead,
    ReportCreate,

    // Follow-ups on guest visits
    FollowUpList,
    FollowUpRead,
    FollowUpStart,
    FollowUpAddNote,
    FollowUpClose,

    // Central service reports
    ServiceReportCreate,
}

impl Action {
    /// Actions reserved for Super Admin unless the policy grants
    /// Administration the same rights.
    #[must_use]
    pub const fn reserved_for_super_admin(self) -> bool {
        matches!(
            self,
            Action::UserList
                | Action::UserCreate
                | Action::UserUpdate
                | Action::UserDeactivate
                | Action::NetworkList
                | Action::NetworkCreate
                | Action::NetworkUpdate
                | Action::NetworkDelete
        )
    }

    /// Actions a group leader may perform inside the group they lead.
    ///
    /// Reassignment is deliberately absent: a leader may edit their own
    /// members but never move one to a different group.
    #[must_use]
    pub const fn permitted_to_group_leader(self) -> bool {
        matches!(
            self,
            Action::GroupRead
                | Action::MemberList
                | Action::MemberRead
                | Action::MemberCreate
                | Action::MemberUpdate
                | Action::MemberDeactivate
                | Action::ReportList
                | Action::ReportRead
                | Action::ReportCreate
                | Action::FollowUpList
                | Action::FollowUpRead
                | Action::FollowUpStart
                | Action::FollowUpAddNote
                | Action::FollowUpClose
        )
    }

    /// Actions a subnet leader may perform on groups they supervise.
    ///
    /// Everything a group leader may do, plus listing the supervised
    /// groups and moving members between them.
    #[must_use]
    pub const fn permitted_to_subnet_leader(self) -> bool {
        self.permitted_to_group_leader()
            || matches!(self, Action::GroupList | Action::MemberReassign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_set() {
        assert!(Action::UserCreate.reserved_for_super_admin());
        assert!(Action::UserDeactivate.reserved_for_super_admin());
        assert!(Action::NetworkCreate.reserved_for_super_admin());
        assert!(!Action::GroupCreate.reserved_for_super_admin());
        assert!(!Action::MemberHardDelete.reserved_for_super_admin());
    }

    #[test]
    fn test_group_leader_set_excludes_reassignment() {
        assert!(Action::MemberCreate.permitted_to_group_leader());
        assert!(Action::MemberUpdate.permitted_to_group_leader());
        assert!(Action::ReportCreate.permitted_to_group_leader());
        assert!(!Action::MemberReassign.permitted_to_group_leader());
        assert!(!Action::MemberHardDelete.permitted_to_group_leader());
        assert!(!Action::GroupCreate.permitted_to_group_leader());
        assert!(!Action::UserCreate.permitted_to_group_leader());
    }

    #[test]
    fn test_subnet_leader_set_is_a_superset() {
        assert!(Action::MemberReassign.permitted_to_subnet_leader());
        assert!(Action::GroupList.permitted_to_subnet_leader());
        // everything the leader can do, the supervisor can too
        assert!(Action::MemberCreate.permitted_to_subnet_leader());
        assert!(Action::FollowUpAddNote.permitted_to_subnet_leader());
        // but not the global-only or reserved actions
        assert!(!Action::GroupDelete.permitted_to_subnet_leader());
        assert!(!Action::MemberPhaseUpdate.permitted_to_subnet_leader());
        assert!(!Action::NetworkDelete.permitted_to_subnet_leader());
    }
}
