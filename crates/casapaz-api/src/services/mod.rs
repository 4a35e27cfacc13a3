//! Mutation-guard services.
//!
//! Each service composes the engine's decision with the state invariants
//! of its entity, check-then-act: a failed authorization aborts before
//! any write.

pub mod follow_up_service;
pub mod group_service;
pub mod member_service;
pub mod report_service;
