//! Follow-up model (`Seguimiento`) and its notes (`NotasSeguimiento`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::Result;

/// A tracked outreach task originating from a guest visit.
///
/// At most one follow-up exists per visit; the UNIQUE constraint on
/// `id_visita` turns a duplicate start into a conflict.
#[derive(Debug, Clone, FromRow)]
pub struct FollowUp {
    pub id_seguimiento: i64,
    pub id_visita: i64,
    pub estado: String,
}

/// A free-text note on a follow-up.
#[derive(Debug, Clone, FromRow)]
pub struct Note {
    pub id_nota: i64,
    pub id_seguimiento: i64,
    pub id_usuario: i64,
    pub contenido: String,
    pub fecha_nota: DateTime<Utc>,
}

/// A note with its author, for detail views.
#[derive(Debug, Clone, FromRow)]
pub struct NoteWithAuthor {
    pub id_nota: i64,
    pub contenido: String,
    pub fecha_nota: DateTime<Utc>,
    pub nombre_usuario: String,
    pub id_rol: i16,
}

/// A visit pending (or under active) follow-up, for work lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingFollowUp {
    pub id_visita: i64,
    pub nombre: String,
    pub telefono: Option<String>,
    pub decision: String,
    pub fecha_reporte: chrono::NaiveDate,
    pub id_seguimiento: Option<i64>,
    pub estado: Option<String>,
    pub cdp_asociada: String,
}

/// Follow-up header joined with its visit, for detail views.
#[derive(Debug, Clone, FromRow)]
pub struct FollowUpDetail {
    pub id_seguimiento: i64,
    pub estado: String,
    pub nombre_visita: String,
    pub telefono: Option<String>,
    pub decision: String,
    pub id_reporte_cdp: i64,
}

const PENDING_SELECT: &str = r#"
    SELECT
        v.id_visita,
        v.nombre,
        v.telefono,
        v.decision,
        rc.fecha_reporte,
        s.id_seguimiento,
        s.estado,
        cdp.nombre_lider_cdp AS cdp_asociada
    FROM "VisitasCdP" v
    JOIN "ReporteCdP" rc ON v.id_reporte_cdp = rc.id_reporte_cdp
    JOIN "CasasDePaz" cdp ON rc.id_lider = cdp.id_lider
    LEFT JOIN "Seguimiento" s ON v.id_visita = s.id_visita
"#;

impl FollowUp {
    /// Find a follow-up by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let follow_up =
            sqlx::query_as(r#"SELECT * FROM "Seguimiento" WHERE id_seguimiento = $1"#)
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(follow_up)
    }

    /// Start a follow-up for a visit. A second start on the same visit
    /// surfaces as a unique violation.
    pub async fn start(pool: &PgPool, id_visita: i64) -> Result<Self> {
        let follow_up = sqlx::query_as(
            r#"
            INSERT INTO "Seguimiento" (id_visita)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(id_visita)
        .fetch_one(pool)
        .await?;
        Ok(follow_up)
    }

    /// Change the follow-up state (`Activo` / `Finalizado`).
    pub async fn set_estado(pool: &PgPool, id: i64, estado: &str) -> Result<Option<Self>> {
        let follow_up = sqlx::query_as(
            r#"
            UPDATE "Seguimiento" SET estado = $2
            WHERE id_seguimiento = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(estado)
        .fetch_optional(pool)
        .await?;
        Ok(follow_up)
    }

    /// Append a note.
    pub async fn add_note(
        pool: &PgPool,
        id_seguimiento: i64,
        id_usuario: i64,
        contenido: &str,
    ) -> Result<Note> {
        let note = sqlx::query_as(
            r#"
            INSERT INTO "NotasSeguimiento" (id_seguimiento, id_usuario, contenido)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(id_seguimiento)
        .bind(id_usuario)
        .bind(contenido)
        .fetch_one(pool)
        .await?;
        Ok(note)
    }

    /// The ordered note history with authors.
    pub async fn notes(pool: &PgPool, id_seguimiento: i64) -> Result<Vec<NoteWithAuthor>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                ns.id_nota,
                ns.contenido,
                ns.fecha_nota,
                u.nombre AS nombre_usuario,
                u.id_rol
            FROM "NotasSeguimiento" ns
            JOIN "Usuarios" u ON ns.id_usuario = u.id_usuario
            WHERE ns.id_seguimiento = $1
            ORDER BY ns.fecha_nota ASC
            "#,
        )
        .bind(id_seguimiento)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Follow-up header with its originating visit.
    pub async fn detail(pool: &PgPool, id: i64) -> Result<Option<FollowUpDetail>> {
        let detail = sqlx::query_as(
            r#"
            SELECT
                s.id_seguimiento,
                s.estado,
                v.nombre AS nombre_visita,
                v.telefono,
                v.decision,
                rc.id_reporte_cdp
            FROM "Seguimiento" s
            JOIN "VisitasCdP" v ON s.id_visita = v.id_visita
            JOIN "ReporteCdP" rc ON v.id_reporte_cdp = rc.id_reporte_cdp
            WHERE s.id_seguimiento = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(detail)
    }

    /// Visits with no follow-up yet, or with an active one — everything.
    pub async fn pending_all(pool: &PgPool) -> Result<Vec<PendingFollowUp>> {
        let query = format!(
            "{PENDING_SELECT}
            WHERE s.estado IS NULL OR s.estado = 'Activo'
            ORDER BY rc.fecha_reporte DESC"
        );
        let rows = sqlx::query_as(&query).fetch_all(pool).await?;
        Ok(rows)
    }

    /// Pending follow-ups of one leader's group.
    pub async fn pending_by_leader(pool: &PgPool, id_lider: i64) -> Result<Vec<PendingFollowUp>> {
        let query = format!(
            "{PENDING_SELECT}
            WHERE rc.id_lider = $1
              AND (s.estado IS NULL OR s.estado = 'Activo')
            ORDER BY rc.fecha_reporte DESC"
        );
        let rows = sqlx::query_as(&query).bind(id_lider).fetch_all(pool).await?;
        Ok(rows)
    }

    /// Pending follow-ups across a subnet.
    pub async fn pending_by_subnet_leader(
        pool: &PgPool,
        id_lsr: i64,
    ) -> Result<Vec<PendingFollowUp>> {
        let query = format!(
            "{PENDING_SELECT}
            WHERE cdp.id_lsr = $1
              AND (s.estado IS NULL OR s.estado = 'Activo')
            ORDER BY rc.fecha_reporte DESC"
        );
        let rows = sqlx::query_as(&query).bind(id_lsr).fetch_all(pool).await?;
        Ok(rows)
    }
}
