//! Relational layer for the casapaz backend.
//!
//! sqlx models over the original schema (table and column names are
//! preserved), the Postgres-backed implementation of the authorization
//! crate's hierarchy seam, and the embedded migrations.
//!
//! Models follow one pattern: a `FromRow` struct with associated async
//! query functions taking `&PgPool`, plus explicit allow-listed update
//! structs — caller-supplied keys never become SQL.

pub mod error;
pub mod migrations;
pub mod models;
pub mod store;

pub use error::{DbError, Result};
pub use migrations::{run_migrations, MIGRATOR};
pub use store::PgHierarchyStore;
