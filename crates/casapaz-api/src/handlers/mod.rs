//! HTTP endpoint handlers.

pub mod analytics;
pub mod auth;
pub mod follow_ups;
pub mod groups;
pub mod members;
pub mod networks;
pub mod reports;
pub mod users;
