//! casapaz Core Library
//!
//! Shared types for the Casas de Paz membership backend.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`UserId`, `GroupId`, `MemberId`, ...)
//! - [`roles`] - The role model (`Role`)
//!
//! # Example
//!
//! ```
//! use casapaz_core::{GroupId, Role, UserId};
//!
//! let leader = UserId::from_i64(42);
//! let group = GroupId::from_i64(7);
//!
//! assert!(!Role::GroupLeader.is_global());
//! assert!(Role::Administration.is_global());
//! assert_eq!(format!("{leader} leads {group}"), "42 leads 7");
//! ```

pub mod ids;
pub mod roles;

// Re-export main types for convenient access
pub use ids::{
    FollowUpId, GroupId, MemberId, NetworkId, NoteId, ParseIdError, PhaseId, ReportId, UserId,
    VisitId,
};
pub use roles::Role;
