//! Network model (`Redes`).

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::Result;

/// A top-level network grouping ("Red").
#[derive(Debug, Clone, FromRow)]
pub struct Network {
    pub id_red: i64,
    pub nombre_red: String,
}

/// A network row with its group count, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NetworkSummary {
    pub id_red: i64,
    pub nombre_red: String,
    pub total_cdp: i64,
}

impl Network {
    /// Find a network by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let network = sqlx::query_as(r#"SELECT * FROM "Redes" WHERE id_red = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(network)
    }

    /// List all networks with the number of groups assigned to each.
    pub async fn list_with_group_counts(pool: &PgPool) -> Result<Vec<NetworkSummary>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                r.id_red,
                r.nombre_red,
                COUNT(cdp.id_cdp) AS total_cdp
            FROM "Redes" r
            LEFT JOIN "CasasDePaz" cdp ON r.id_red = cdp.id_red
            GROUP BY r.id_red, r.nombre_red
            ORDER BY r.id_red
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Create a network. A duplicate name surfaces as a unique violation.
    pub async fn create(pool: &PgPool, nombre_red: &str) -> Result<Self> {
        let network = sqlx::query_as(
            r#"
            INSERT INTO "Redes" (nombre_red)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(nombre_red)
        .fetch_one(pool)
        .await?;
        Ok(network)
    }

    /// Rename a network.
    pub async fn rename(pool: &PgPool, id: i64, nombre_red: &str) -> Result<Option<Self>> {
        let network = sqlx::query_as(
            r#"
            UPDATE "Redes" SET nombre_red = $2
            WHERE id_red = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(nombre_red)
        .fetch_optional(pool)
        .await?;
        Ok(network)
    }

    /// Delete a network. Dependent groups surface as a foreign-key
    /// violation, which callers report as a dependency conflict.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<()> {
        sqlx::query(r#"DELETE FROM "Redes" WHERE id_red = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of groups assigned to this network.
    pub async fn count_groups(pool: &PgPool, id: i64) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM "CasasDePaz" WHERE id_red = $1"#)
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count.0)
    }
}
