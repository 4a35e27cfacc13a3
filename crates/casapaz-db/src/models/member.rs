//! Member model (`Miembros`).

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::Result;

/// A person affiliated with a home group.
///
/// `id_cdp` is nullable: administration may register a member before any
/// group assignment; such a member is visible only to global roles.
/// Members are soft-deleted via `estado`, never hard-deleted in the
/// normal flow.
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id_miembro: i64,
    pub id_cdp: Option<i64>,
    pub nombre: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub referencia: Option<String>,
    pub sexo: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub fecha_conversion: Option<NaiveDate>,
    pub fecha_bautizo: Option<NaiveDate>,
    pub fecha_boda: Option<NaiveDate>,
    pub estado: String,
}

/// Fields for registering a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id_cdp: Option<i64>,
    pub nombre: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub referencia: Option<String>,
    pub sexo: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub fecha_conversion: Option<NaiveDate>,
    pub fecha_bautizo: Option<NaiveDate>,
    pub fecha_boda: Option<NaiveDate>,
}

/// Allow-listed updatable fields for a member.
///
/// Reassignment (`id_cdp`) is deliberately not here: moving a member
/// between groups has its own rules and goes through
/// [`Member::reassign`].
#[derive(Debug, Clone, Default)]
pub struct UpdateMember {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub referencia: Option<String>,
    pub sexo: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub fecha_conversion: Option<NaiveDate>,
    pub fecha_bautizo: Option<NaiveDate>,
    pub fecha_boda: Option<NaiveDate>,
    pub estado: Option<String>,
}

impl UpdateMember {
    /// Whether the update carries any change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.telefono.is_none()
            && self.direccion.is_none()
            && self.referencia.is_none()
            && self.sexo.is_none()
            && self.fecha_nacimiento.is_none()
            && self.fecha_conversion.is_none()
            && self.fecha_bautizo.is_none()
            && self.fecha_boda.is_none()
            && self.estado.is_none()
    }
}

/// A member row as shown in listings, with its group name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberSummary {
    pub id_miembro: i64,
    pub nombre: String,
    pub telefono: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub estado: String,
    pub cdp_asignada: Option<String>,
}

/// Age in completed years at `today`.
#[must_use]
pub fn edad(fecha_nacimiento: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - fecha_nacimiento.year();
    if (today.month(), today.day()) < (fecha_nacimiento.month(), fecha_nacimiento.day()) {
        age -= 1;
    }
    age
}

impl Member {
    /// Age in completed years today.
    #[must_use]
    pub fn edad(&self) -> i32 {
        edad(self.fecha_nacimiento, Utc::now().date_naive())
    }

    /// Find a member by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let member = sqlx::query_as(r#"SELECT * FROM "Miembros" WHERE id_miembro = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(member)
    }

    /// List every member in the system, with group names.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<MemberSummary>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                m.id_miembro, m.nombre, m.telefono, m.fecha_nacimiento, m.estado,
                c.nombre_lider_cdp AS cdp_asignada
            FROM "Miembros" m
            LEFT JOIN "CasasDePaz" c ON m.id_cdp = c.id_cdp
            ORDER BY m.nombre ASC
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// List the members of the group led by `id_lider`.
    pub async fn list_by_leader(pool: &PgPool, id_lider: i64) -> Result<Vec<MemberSummary>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                m.id_miembro, m.nombre, m.telefono, m.fecha_nacimiento, m.estado,
                c.nombre_lider_cdp AS cdp_asignada
            FROM "Miembros" m
            JOIN "CasasDePaz" c ON m.id_cdp = c.id_cdp
            WHERE c.id_lider = $1
            ORDER BY m.nombre ASC
            "#,
        )
        .bind(id_lider)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// List the members of every group supervised by `id_lsr`.
    pub async fn list_by_subnet_leader(pool: &PgPool, id_lsr: i64) -> Result<Vec<MemberSummary>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                m.id_miembro, m.nombre, m.telefono, m.fecha_nacimiento, m.estado,
                c.nombre_lider_cdp AS cdp_asignada
            FROM "Miembros" m
            JOIN "CasasDePaz" c ON m.id_cdp = c.id_cdp
            WHERE c.id_lsr = $1
            ORDER BY c.nombre_lider_cdp, m.nombre ASC
            "#,
        )
        .bind(id_lsr)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// List the members of one group.
    pub async fn list_by_group(pool: &PgPool, id_cdp: i64) -> Result<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT * FROM "Miembros"
            WHERE id_cdp = $1
            ORDER BY nombre ASC
            "#,
        )
        .bind(id_cdp)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Register a member. `estado` starts as `Activo`.
    pub async fn create(pool: &PgPool, new: &NewMember) -> Result<Self> {
        let member = sqlx::query_as(
            r#"
            INSERT INTO "Miembros" (
                id_cdp, nombre, telefono, direccion, referencia, sexo,
                fecha_nacimiento, fecha_conversion, fecha_bautizo, fecha_boda, estado
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'Activo')
            RETURNING *
            "#,
        )
        .bind(new.id_cdp)
        .bind(&new.nombre)
        .bind(&new.telefono)
        .bind(&new.direccion)
        .bind(&new.referencia)
        .bind(&new.sexo)
        .bind(new.fecha_nacimiento)
        .bind(new.fecha_conversion)
        .bind(new.fecha_bautizo)
        .bind(new.fecha_boda)
        .fetch_one(pool)
        .await?;
        Ok(member)
    }

    /// Apply an allow-listed partial update.
    pub async fn update(pool: &PgPool, id: i64, changes: &UpdateMember) -> Result<Option<Self>> {
        let member = sqlx::query_as(
            r#"
            UPDATE "Miembros"
            SET nombre = COALESCE($2, nombre),
                telefono = COALESCE($3, telefono),
                direccion = COALESCE($4, direccion),
                referencia = COALESCE($5, referencia),
                sexo = COALESCE($6, sexo),
                fecha_nacimiento = COALESCE($7, fecha_nacimiento),
                fecha_conversion = COALESCE($8, fecha_conversion),
                fecha_bautizo = COALESCE($9, fecha_bautizo),
                fecha_boda = COALESCE($10, fecha_boda),
                estado = COALESCE($11, estado)
            WHERE id_miembro = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.nombre)
        .bind(&changes.telefono)
        .bind(&changes.direccion)
        .bind(&changes.referencia)
        .bind(&changes.sexo)
        .bind(changes.fecha_nacimiento)
        .bind(changes.fecha_conversion)
        .bind(changes.fecha_bautizo)
        .bind(changes.fecha_boda)
        .bind(&changes.estado)
        .fetch_optional(pool)
        .await?;
        Ok(member)
    }

    /// Set the lifecycle state.
    pub async fn set_estado(pool: &PgPool, id: i64, estado: &str) -> Result<Option<Self>> {
        let member = sqlx::query_as(
            r#"
            UPDATE "Miembros" SET estado = $2
            WHERE id_miembro = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(estado)
        .fetch_optional(pool)
        .await?;
        Ok(member)
    }

    /// Move a member to another group.
    pub async fn reassign(pool: &PgPool, id: i64, id_cdp: i64) -> Result<Option<Self>> {
        let member = sqlx::query_as(
            r#"
            UPDATE "Miembros" SET id_cdp = $2
            WHERE id_miembro = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(id_cdp)
        .fetch_optional(pool)
        .await?;
        Ok(member)
    }

    /// Permanently delete a member. Dependent attendance rows surface as
    /// a foreign-key violation.
    pub async fn hard_delete(pool: &PgPool, id: i64) -> Result<()> {
        sqlx::query(r#"DELETE FROM "Miembros" WHERE id_miembro = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of attendance rows referencing this member.
    pub async fn count_attendance(pool: &PgPool, id: i64) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM "AsistenciaCdP" WHERE id_miembro = $1"#)
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count.0)
    }
}
