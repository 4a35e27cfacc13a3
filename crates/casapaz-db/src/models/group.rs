//! Home group model (`CasasDePaz`).

use chrono::NaiveTime;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::Result;

/// A home group ("Casa de Paz").
///
/// `id_lider` is UNIQUE at the database level: a group leader leads at
/// most one group, and that constraint — not the application pre-check —
/// is the authority when two assignments race.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id_cdp: i64,
    pub nombre_lider_cdp: String,
    pub id_lider: Option<i64>,
    pub id_lsr: Option<i64>,
    pub id_red: i64,
    pub direccion: String,
    pub referencia: Option<String>,
    pub latitud: f64,
    pub longitud: f64,
    pub dia_reunion: Option<String>,
    pub hora_reunion: Option<NaiveTime>,
}

/// Fields for creating a group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub nombre_lider_cdp: String,
    pub id_lider: Option<i64>,
    pub id_lsr: Option<i64>,
    pub id_red: i64,
    pub direccion: String,
    pub referencia: Option<String>,
    pub latitud: f64,
    pub longitud: f64,
    pub dia_reunion: Option<String>,
    pub hora_reunion: Option<NaiveTime>,
}

/// Allow-listed updatable fields for a group. Absent fields keep their
/// current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateGroup {
    pub nombre_lider_cdp: Option<String>,
    pub id_lider: Option<i64>,
    pub id_lsr: Option<i64>,
    pub id_red: Option<i64>,
    pub direccion: Option<String>,
    pub referencia: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub dia_reunion: Option<String>,
    pub hora_reunion: Option<NaiveTime>,
}

impl UpdateGroup {
    /// Whether the update carries any change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nombre_lider_cdp.is_none()
            && self.id_lider.is_none()
            && self.id_lsr.is_none()
            && self.id_red.is_none()
            && self.direccion.is_none()
            && self.referencia.is_none()
            && self.latitud.is_none()
            && self.longitud.is_none()
            && self.dia_reunion.is_none()
            && self.hora_reunion.is_none()
    }
}

/// A group row with leader/supervisor names and member count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupSummary {
    pub id_cdp: i64,
    pub nombre_lider_cdp: String,
    pub id_lider: Option<i64>,
    pub nombre_lider: Option<String>,
    pub id_lsr: Option<i64>,
    pub nombre_lsr: Option<String>,
    pub total_miembros: i64,
}

const SUMMARY_SELECT: &str = r#"
    SELECT
        c.id_cdp,
        c.nombre_lider_cdp,
        c.id_lider,
        u_lider.nombre AS nombre_lider,
        c.id_lsr,
        u_lsr.nombre AS nombre_lsr,
        COUNT(m.id_miembro) AS total_miembros
    FROM "CasasDePaz" c
    LEFT JOIN "Usuarios" u_lider ON c.id_lider = u_lider.id_usuario
    LEFT JOIN "Usuarios" u_lsr ON c.id_lsr = u_lsr.id_usuario
    LEFT JOIN "Miembros" m ON c.id_cdp = m.id_cdp
"#;

impl Group {
    /// Find a group by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let group = sqlx::query_as(r#"SELECT * FROM "CasasDePaz" WHERE id_cdp = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(group)
    }

    /// The single group led by a user, if any.
    pub async fn find_by_leader(pool: &PgPool, id_lider: i64) -> Result<Option<Self>> {
        let group = sqlx::query_as(r#"SELECT * FROM "CasasDePaz" WHERE id_lider = $1"#)
            .bind(id_lider)
            .fetch_optional(pool)
            .await?;
        Ok(group)
    }

    /// List all groups with leader/supervisor names and member counts.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<GroupSummary>> {
        let query = format!(
            "{SUMMARY_SELECT}
            GROUP BY c.id_cdp, u_lider.nombre, u_lsr.nombre
            ORDER BY c.nombre_lider_cdp ASC"
        );
        let rows = sqlx::query_as(&query).fetch_all(pool).await?;
        Ok(rows)
    }

    /// List the groups supervised by a subnet leader.
    pub async fn list_by_subnet_leader(pool: &PgPool, id_lsr: i64) -> Result<Vec<GroupSummary>> {
        let query = format!(
            "{SUMMARY_SELECT}
            WHERE c.id_lsr = $1
            GROUP BY c.id_cdp, u_lider.nombre, u_lsr.nombre
            ORDER BY c.nombre_lider_cdp ASC"
        );
        let rows = sqlx::query_as(&query).bind(id_lsr).fetch_all(pool).await?;
        Ok(rows)
    }

    /// Create a group.
    pub async fn create(pool: &PgPool, new: &NewGroup) -> Result<Self> {
        let group = sqlx::query_as(
            r#"
            INSERT INTO "CasasDePaz" (
                nombre_lider_cdp, id_lider, id_lsr, id_red,
                direccion, referencia, latitud, longitud,
                dia_reunion, hora_reunion
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&new.nombre_lider_cdp)
        .bind(new.id_lider)
        .bind(new.id_lsr)
        .bind(new.id_red)
        .bind(&new.direccion)
        .bind(&new.referencia)
        .bind(new.latitud)
        .bind(new.longitud)
        .bind(&new.dia_reunion)
        .bind(new.hora_reunion)
        .fetch_one(pool)
        .await?;
        Ok(group)
    }

    /// Apply an allow-listed partial update.
    pub async fn update(pool: &PgPool, id: i64, changes: &UpdateGroup) -> Result<Option<Self>> {
        let group = sqlx::query_as(
            r#"
            UPDATE "CasasDePaz"
            SET nombre_lider_cdp = COALESCE($2, nombre_lider_cdp),
                id_lider = COALESCE($3, id_lider),
                id_lsr = COALESCE($4, id_lsr),
                id_red = COALESCE($5, id_red),
                direccion = COALESCE($6, direccion),
                referencia = COALESCE($7, referencia),
                latitud = COALESCE($8, latitud),
                longitud = COALESCE($9, longitud),
                dia_reunion = COALESCE($10, dia_reunion),
                hora_reunion = COALESCE($11, hora_reunion)
            WHERE id_cdp = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.nombre_lider_cdp)
        .bind(changes.id_lider)
        .bind(changes.id_lsr)
        .bind(changes.id_red)
        .bind(&changes.direccion)
        .bind(&changes.referencia)
        .bind(changes.latitud)
        .bind(changes.longitud)
        .bind(&changes.dia_reunion)
        .bind(changes.hora_reunion)
        .fetch_optional(pool)
        .await?;
        Ok(group)
    }

    /// Assign a leader to a group. A leader already holding another
    /// group surfaces as a unique violation from the store of record.
    pub async fn assign_leader(pool: &PgPool, id: i64, id_lider: i64) -> Result<Option<Self>> {
        let group = sqlx::query_as(
            r#"
            UPDATE "CasasDePaz" SET id_lider = $2
            WHERE id_cdp = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(id_lider)
        .fetch_optional(pool)
        .await?;
        Ok(group)
    }

    /// Delete a group. Dependent members or reports surface as a
    /// foreign-key violation.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<()> {
        sqlx::query(r#"DELETE FROM "CasasDePaz" WHERE id_cdp = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of members assigned to this group.
    pub async fn count_members(pool: &PgPool, id: i64) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM "Miembros" WHERE id_cdp = $1"#)
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count.0)
    }

    /// Number of weekly reports filed for this group (through its leader).
    pub async fn count_reports(pool: &PgPool, id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM "ReporteCdP" rc
            JOIN "CasasDePaz" c ON rc.id_lider = c.id_lider
            WHERE c.id_cdp = $1
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }
}
