//! Vision phase models (`FasesVision`, `MiembroFase`).

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::Result;

/// An ordered discipleship milestone.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VisionPhase {
    pub id_fase: i64,
    pub nombre_fase: String,
}

/// A member's approval of one phase.
#[derive(Debug, Clone, FromRow)]
pub struct MemberPhase {
    pub id_miembro: i64,
    pub id_fase: i64,
    pub fecha_aprobacion: NaiveDate,
}

/// One phase with its member count, for summaries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PhaseSummary {
    pub id_fase: i64,
    pub nombre_fase: String,
    pub total_miembros: i64,
}

/// One phase with the count of subnet members currently in it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubnetPhaseSummary {
    pub nombre_fase: String,
    pub total_miembros: i64,
}

impl VisionPhase {
    /// The phase catalog, in order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as(r#"SELECT * FROM "FasesVision" ORDER BY id_fase"#)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }
}

impl MemberPhase {
    /// Record (or re-date) a member's approval of a phase.
    ///
    /// An existing approval only has its date updated. A dangling member
    /// or phase reference surfaces as a foreign-key violation.
    pub async fn upsert(
        pool: &PgPool,
        id_miembro: i64,
        id_fase: i64,
        fecha_aprobacion: Option<NaiveDate>,
    ) -> Result<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO "MiembroFase" (id_miembro, id_fase, fecha_aprobacion)
            VALUES ($1, $2, COALESCE($3, CURRENT_DATE))
            ON CONFLICT (id_miembro, id_fase) DO UPDATE
            SET fecha_aprobacion = EXCLUDED.fecha_aprobacion
            RETURNING *
            "#,
        )
        .bind(id_miembro)
        .bind(id_fase)
        .bind(fecha_aprobacion)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    /// Members per phase across the whole system.
    pub async fn summary_global(pool: &PgPool) -> Result<Vec<PhaseSummary>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                fv.id_fase,
                fv.nombre_fase,
                COUNT(mf.id_miembro) AS total_miembros
            FROM "FasesVision" fv
            LEFT JOIN "MiembroFase" mf ON fv.id_fase = mf.id_fase
            GROUP BY fv.id_fase, fv.nombre_fase
            ORDER BY fv.id_fase
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Active subnet members per current phase.
    ///
    /// A member's current phase is the most recently approved one.
    pub async fn summary_by_subnet_leader(
        pool: &PgPool,
        id_lsr: i64,
    ) -> Result<Vec<SubnetPhaseSummary>> {
        let rows = sqlx::query_as(
            r#"
            WITH UltimaFase AS (
                SELECT
                    mf.id_miembro,
                    mf.id_fase,
                    ROW_NUMBER() OVER (
                        PARTITION BY mf.id_miembro
                        ORDER BY mf.fecha_aprobacion DESC
                    ) AS rn
                FROM "MiembroFase" mf
            )
            SELECT
                fv.nombre_fase,
                COUNT(m.id_miembro) AS total_miembros
            FROM "Miembros" m
            JOIN "CasasDePaz" cdp ON m.id_cdp = cdp.id_cdp
            JOIN UltimaFase uf ON m.id_miembro = uf.id_miembro AND uf.rn = 1
            JOIN "FasesVision" fv ON uf.id_fase = fv.id_fase
            WHERE cdp.id_lsr = $1
              AND m.estado = 'Activo'
            GROUP BY fv.nombre_fase
            ORDER BY fv.nombre_fase
            "#,
        )
        .bind(id_lsr)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
