//! Embedded database migrations.

use sqlx::migrate::Migrator;
use sqlx::PgPool;

use crate::error::Result;

/// The embedded migrator for the casapaz schema.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply all pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
