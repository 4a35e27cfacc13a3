//! Hierarchical authorization for the casapaz backend.
//!
//! This crate decides, for any actor (user id + role) and any resource
//! (a member, a home group, a report, a follow-up), whether an operation
//! is permitted and which rows a listing may return. It consolidates the
//! permission checks the original system repeated per controller into
//! one decision table.
//!
//! # Modules
//!
//! - [`actor`] / [`action`] - who is asking, and for what
//! - [`chain`] - resolved ownership paths (group → leader, supervisor, network)
//! - [`store`] - the read-only hierarchy resolver seam (+ in-memory impl)
//! - [`engine`] - the `authorize(actor, action, target)` decision table
//! - [`scope`] - row filters for listings and scoped lookups
//! - [`guard`] - lifecycle and dependency invariants for mutations
//! - [`policy`] - deployment-level policy switches
//! - [`error`] - the full error taxonomy with stable reason codes
//!
//! # Example
//!
//! ```
//! use casapaz_authz::{scope, Actor, ResourceKind, Scope};
//! use casapaz_core::{Role, UserId};
//!
//! // A subnet leader only ever sees the rows of their own subnet.
//! let lsr = Actor::new(UserId::from_i64(10), Role::SubnetLeader);
//! assert_eq!(
//!     scope(&lsr, ResourceKind::Member),
//!     Scope::SubnetOf(UserId::from_i64(10)),
//! );
//! ```

pub mod action;
pub mod actor;
pub mod chain;
pub mod engine;
pub mod error;
pub mod guard;
pub mod policy;
pub mod scope;
pub mod store;

pub use action::Action;
pub use actor::Actor;
pub use chain::{Chain, MemberChain};
pub use engine::{AuthorizationEngine, Target};
pub use error::{AssignmentViolation, AuthzError, DenyReason, Result, StoreError};
pub use guard::{ensure_no_dependents, plan_deactivation, Deactivation, MemberLifecycle};
pub use policy::AuthzPolicy;
pub use scope::{scope, ResourceKind, Scope};
pub use store::{GroupRef, HierarchyStore, InMemoryHierarchyStore, UserAccount};
