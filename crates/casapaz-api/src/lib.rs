//! HTTP surface for the casapaz backend.
//!
//! Thin axum handlers over the mutation-guard services; every scoped
//! operation goes through the authorization engine before any data
//! access. Errors render as RFC 7807 problem documents carrying the
//! stable reason codes of the authorization taxonomy.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

pub use error::ApiError;
pub use middleware::TokenSettings;
pub use router::router;

/// The authorization engine as deployed: decision table over the
/// Postgres-backed hierarchy store.
pub type Engine = casapaz_authz::AuthorizationEngine<casapaz_db::PgHierarchyStore>;
