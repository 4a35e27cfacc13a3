//! Ownership chains.
//!
//! A chain is the resolved ownership path of a home group: who leads it,
//! who supervises it, and which network it belongs to. Every scoping
//! decision is made against a freshly resolved chain; chains are never
//! cached across requests because leader and supervisor assignments can
//! change between two calls.

use casapaz_core::{GroupId, MemberId, NetworkId, UserId};

/// The resolved ownership path of a home group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// The group this chain was resolved for.
    pub group_id: GroupId,
    /// The group's leader, if one is assigned.
    pub leader_id: Option<UserId>,
    /// The supervising subnet leader, if one is assigned.
    pub subnet_leader_id: Option<UserId>,
    /// The network the group belongs to.
    pub network_id: NetworkId,
}

impl Chain {
    /// Whether `user` is the assigned leader of this chain's group.
    #[must_use]
    pub fn is_led_by(&self, user: UserId) -> bool {
        self.leader_id == Some(user)
    }

    /// Whether `user` is the supervising subnet leader of this chain's group.
    #[must_use]
    pub fn is_supervised_by(&self, user: UserId) -> bool {
        self.subnet_leader_id == Some(user)
    }
}

/// The ownership chain of a member.
///
/// A member may be created without a group assignment (`group` is then
/// `None`); such a member is visible only to global roles until it is
/// assigned somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberChain {
    /// The member this chain was resolved for.
    pub member_id: MemberId,
    /// The chain of the member's group, when the member is assigned.
    pub group: Option<Chain>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(leader: Option<i64>, lsr: Option<i64>) -> Chain {
        Chain {
            group_id: GroupId::from_i64(7),
            leader_id: leader.map(UserId::from_i64),
            subnet_leader_id: lsr.map(UserId::from_i64),
            network_id: NetworkId::from_i64(1),
        }
    }

    #[test]
    fn test_led_and_supervised() {
        let c = chain(Some(42), Some(10));
        assert!(c.is_led_by(UserId::from_i64(42)));
        assert!(!c.is_led_by(UserId::from_i64(43)));
        assert!(c.is_supervised_by(UserId::from_i64(10)));
        assert!(!c.is_supervised_by(UserId::from_i64(11)));
    }

    #[test]
    fn test_unassigned_chain_matches_nobody() {
        let c = chain(None, None);
        assert!(!c.is_led_by(UserId::from_i64(42)));
        assert!(!c.is_supervised_by(UserId::from_i64(10)));
    }
}
