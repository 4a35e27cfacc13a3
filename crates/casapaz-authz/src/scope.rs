//! Visibility scoping.
//!
//! Every "list X" and "get X by id" operation narrows its result set
//! through [`scope`]. The scoper never answers whether an operation is
//! permitted (that is the engine's job); it answers which rows an actor
//! may see. Fetching a single resource that exists outside the actor's
//! scope is a denial, not a 404: clients can rely on the distinction
//! between "forbidden" and "missing".

use casapaz_core::{Role, UserId};

use crate::actor::Actor;
use crate::chain::Chain;

/// The kinds of resources that listings and lookups are scoped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Network,
    Group,
    Member,
    Report,
    FollowUp,
    User,
}

/// A row filter derived from an actor's role and structural position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// No restriction: global roles see everything.
    All,
    /// Rows whose chain is supervised by this subnet leader.
    SubnetOf(UserId),
    /// Rows whose chain is led by this group leader.
    GroupLedBy(UserId),
    /// Only the actor's own row (self-service lookups).
    SelfOnly(UserId),
    /// No rows at all.
    Nothing,
}

impl Scope {
    /// Whether this scope admits a resource with the given chain.
    ///
    /// A `None` chain means the resource is not attached to any group
    /// (e.g. a member created before assignment); only the unrestricted
    /// scope admits those.
    #[must_use]
    pub fn permits_chain(&self, chain: Option<&Chain>) -> bool {
        match self {
            Scope::All => true,
            Scope::SubnetOf(user) => chain.is_some_and(|c| c.is_supervised_by(*user)),
            Scope::GroupLedBy(user) => chain.is_some_and(|c| c.is_led_by(*user)),
            Scope::SelfOnly(_) | Scope::Nothing => false,
        }
    }

    /// Whether this scope is unrestricted.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        matches!(self, Scope::All)
    }

    /// Whether this scope admits no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Scope::Nothing)
    }
}

/// Derive the row filter for `actor` over `resource`.
///
/// The same scope backs the parent and child resources of a chain, so
/// visibility is consistent across them: a subnet leader sees exactly
/// the members of the groups they supervise, no more, no fewer.
#[must_use]
pub fn scope(actor: &Actor, resource: ResourceKind) -> Scope {
    if !actor.active {
        return Scope::Nothing;
    }

    match actor.role {
        Role::SuperAdmin | Role::Administration => Scope::All,
        Role::SubnetLeader => match resource {
            ResourceKind::Network | ResourceKind::User => Scope::Nothing,
            _ => Scope::SubnetOf(actor.id),
        },
        Role::GroupLeader => match resource {
            ResourceKind::Network | ResourceKind::User => Scope::Nothing,
            _ => Scope::GroupLedBy(actor.id),
        },
        // A service leader or plain member sees only their own account.
        Role::ServiceLeader | Role::Member => match resource {
            ResourceKind::User => Scope::SelfOnly(actor.id),
            _ => Scope::Nothing,
        },
    }
}
