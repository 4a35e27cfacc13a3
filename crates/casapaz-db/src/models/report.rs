//! Weekly group report model (`ReporteCdP`) and its children
//! (`AsistenciaCdP`, `VisitasCdP`).
//!
//! The composite creation path is the one place in the system that
//! requires an explicit all-or-nothing transaction: the parent report,
//! its attendance rows, its visit rows and any seeded follow-ups are
//! written in a single unit, and any failure rolls everything back so no
//! partial report is ever visible.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{DbError, Result};

/// A weekly home-group report with financial totals.
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id_reporte_cdp: i64,
    pub id_lider: i64,
    pub fecha_reporte: NaiveDate,
    pub latitud: f64,
    pub longitud: f64,
    pub ofrendas: Decimal,
    pub diezmos: Decimal,
    pub pactos: Decimal,
    pub primicias: Decimal,
    pub comentarios: Option<String>,
    pub estado_revision: String,
}

/// Fields for the parent report of a composite creation.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub id_lider: i64,
    pub fecha_reporte: NaiveDate,
    pub latitud: f64,
    pub longitud: f64,
    pub ofrendas: Decimal,
    pub diezmos: Decimal,
    pub pactos: Decimal,
    pub primicias: Decimal,
    pub comentarios: Option<String>,
}

/// One attendance entry of a composite creation.
#[derive(Debug, Clone)]
pub struct NewAttendanceEntry {
    pub id_miembro: i64,
    pub asistio: bool,
}

/// One guest visit of a composite creation.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub nombre: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub referencia: Option<String>,
    pub nombre_invitador: Option<String>,
    pub asiste_otra_iglesia: bool,
    pub nombre_otra_iglesia: Option<String>,
    pub tipo: String,
    pub decision: String,
    /// Seed a follow-up for this visit inside the same transaction.
    pub iniciar_seguimiento: bool,
}

/// What a committed composite creation produced.
#[derive(Debug, Clone)]
pub struct CreatedReport {
    pub id_reporte_cdp: i64,
    pub asistentes: usize,
    pub visitas: Vec<i64>,
    pub seguimientos: Vec<i64>,
}

/// A report row as shown in history listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReportSummary {
    pub id_reporte_cdp: i64,
    pub nombre_lider: String,
    pub nombre_cdp: String,
    pub fecha_reporte: NaiveDate,
    pub ofrendas: Decimal,
    pub diezmos: Decimal,
    pub comentarios: Option<String>,
    pub estado_revision: String,
    pub total_visitas: i64,
    pub total_conversiones: i64,
}

/// One member's attendance state in a report detail.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRow {
    pub id_miembro: i64,
    pub nombre: String,
    pub asistio: Option<bool>,
    pub registrado: bool,
}

/// One visit in a report detail, with follow-up state.
#[derive(Debug, Clone, FromRow)]
pub struct VisitRow {
    pub id_visita: i64,
    pub nombre: String,
    pub telefono: Option<String>,
    pub decision: String,
    pub tipo: String,
    pub id_seguimiento: Option<i64>,
    pub estado_seguimiento: Option<String>,
    pub total_notas: i64,
}

const SUMMARY_SELECT: &str = r#"
    SELECT
        rc.id_reporte_cdp,
        u.nombre AS nombre_lider,
        cdp.nombre_lider_cdp AS nombre_cdp,
        rc.fecha_reporte,
        rc.ofrendas,
        rc.diezmos,
        rc.comentarios,
        rc.estado_revision,
        (SELECT COUNT(*) FROM "VisitasCdP" v
         WHERE v.id_reporte_cdp = rc.id_reporte_cdp) AS total_visitas,
        (SELECT COUNT(*) FROM "VisitasCdP" v
         WHERE v.id_reporte_cdp = rc.id_reporte_cdp
           AND v.decision = 'Conversion') AS total_conversiones
    FROM "ReporteCdP" rc
    JOIN "Usuarios" u ON rc.id_lider = u.id_usuario
    JOIN "CasasDePaz" cdp ON rc.id_lider = cdp.id_lider
"#;

impl Report {
    /// Find a report by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let report = sqlx::query_as(r#"SELECT * FROM "ReporteCdP" WHERE id_reporte_cdp = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(report)
    }

    /// History of every report in the system.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ReportSummary>> {
        let query = format!("{SUMMARY_SELECT} ORDER BY rc.fecha_reporte DESC");
        let rows = sqlx::query_as(&query).fetch_all(pool).await?;
        Ok(rows)
    }

    /// History of the reports of one leader.
    pub async fn list_by_leader(pool: &PgPool, id_lider: i64) -> Result<Vec<ReportSummary>> {
        let query = format!(
            "{SUMMARY_SELECT}
            WHERE rc.id_lider = $1
            ORDER BY rc.fecha_reporte DESC"
        );
        let rows = sqlx::query_as(&query).bind(id_lider).fetch_all(pool).await?;
        Ok(rows)
    }

    /// History of the reports across a subnet.
    pub async fn list_by_subnet_leader(pool: &PgPool, id_lsr: i64) -> Result<Vec<ReportSummary>> {
        let query = format!(
            "{SUMMARY_SELECT}
            WHERE cdp.id_lsr = $1
            ORDER BY rc.fecha_reporte DESC"
        );
        let rows = sqlx::query_as(&query).bind(id_lsr).fetch_all(pool).await?;
        Ok(rows)
    }

    /// Create the full report in one transaction: the parent row, the
    /// attendance entries, the visit entries and the seeded follow-ups.
    ///
    /// `id_cdp` is the group of the reporting leader; every attendance
    /// entry must reference a member of that group, and every visit must
    /// carry its `tipo` and `decision`. Any violation aborts the whole
    /// unit — the caller observes a single failure and no rows persist.
    pub async fn create_full(
        pool: &PgPool,
        id_cdp: i64,
        report: &NewReport,
        asistencia: &[NewAttendanceEntry],
        visitas: &[NewVisit],
    ) -> Result<CreatedReport> {
        let mut tx = pool.begin().await?;

        // Attendance may only reference members of the reporting group.
        let member_ids: Vec<i64> = asistencia.iter().map(|a| a.id_miembro).collect();
        if !member_ids.is_empty() {
            let (matching,): (i64,) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM "Miembros"
                WHERE id_miembro = ANY($1) AND id_cdp = $2
                "#,
            )
            .bind(&member_ids)
            .bind(id_cdp)
            .fetch_one(&mut *tx)
            .await?;

            if matching != member_ids.len() as i64 {
                return Err(DbError::ValidationFailed(format!(
                    "one or more attendance entries reference members outside group {id_cdp}"
                )));
            }
        }

        let parent: Report = sqlx::query_as(
            r#"
            INSERT INTO "ReporteCdP" (
                id_lider, fecha_reporte, latitud, longitud,
                ofrendas, diezmos, pactos, primicias, comentarios
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(report.id_lider)
        .bind(report.fecha_reporte)
        .bind(report.latitud)
        .bind(report.longitud)
        .bind(report.ofrendas)
        .bind(report.diezmos)
        .bind(report.pactos)
        .bind(report.primicias)
        .bind(&report.comentarios)
        .fetch_one(&mut *tx)
        .await?;

        for entry in asistencia {
            sqlx::query(
                r#"
                INSERT INTO "AsistenciaCdP" (id_reporte_cdp, id_miembro, asistio)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(parent.id_reporte_cdp)
            .bind(entry.id_miembro)
            .bind(entry.asistio)
            .execute(&mut *tx)
            .await?;
        }

        let mut visit_ids = Vec::with_capacity(visitas.len());
        let mut follow_up_ids = Vec::new();
        for visit in visitas {
            if visit.nombre.trim().is_empty()
                || visit.tipo.trim().is_empty()
                || visit.decision.trim().is_empty()
            {
                return Err(DbError::ValidationFailed(
                    "every visit requires nombre, tipo and decision".to_string(),
                ));
            }

            let (id_visita,): (i64,) = sqlx::query_as(
                r#"
                INSERT INTO "VisitasCdP" (
                    id_reporte_cdp, nombre, telefono, direccion, referencia,
                    nombre_invitador, asiste_otra_iglesia, nombre_otra_iglesia,
                    tipo, decision
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id_visita
                "#,
            )
            .bind(parent.id_reporte_cdp)
            .bind(&visit.nombre)
            .bind(&visit.telefono)
            .bind(&visit.direccion)
            .bind(&visit.referencia)
            .bind(&visit.nombre_invitador)
            .bind(visit.asiste_otra_iglesia)
            .bind(&visit.nombre_otra_iglesia)
            .bind(&visit.tipo)
            .bind(&visit.decision)
            .fetch_one(&mut *tx)
            .await?;
            visit_ids.push(id_visita);

            if visit.iniciar_seguimiento {
                let (id_seguimiento,): (i64,) = sqlx::query_as(
                    r#"
                    INSERT INTO "Seguimiento" (id_visita)
                    VALUES ($1)
                    RETURNING id_seguimiento
                    "#,
                )
                .bind(id_visita)
                .fetch_one(&mut *tx)
                .await?;
                follow_up_ids.push(id_seguimiento);
            }
        }

        tx.commit().await?;

        tracing::info!(
            id_reporte_cdp = parent.id_reporte_cdp,
            id_lider = report.id_lider,
            asistentes = asistencia.len(),
            visitas = visit_ids.len(),
            "Full report committed"
        );

        Ok(CreatedReport {
            id_reporte_cdp: parent.id_reporte_cdp,
            asistentes: asistencia.len(),
            visitas: visit_ids,
            seguimientos: follow_up_ids,
        })
    }

    /// The attendance detail of a report: every member of the group,
    /// marked with their recorded attendance, if any.
    pub async fn attendance_detail(
        pool: &PgPool,
        id_reporte_cdp: i64,
        id_lider: i64,
    ) -> Result<Vec<AttendanceRow>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                m.id_miembro,
                m.nombre,
                acdp.asistio,
                acdp.id_reporte_cdp IS NOT NULL AS registrado
            FROM "Miembros" m
            LEFT JOIN "AsistenciaCdP" acdp
                ON m.id_miembro = acdp.id_miembro AND acdp.id_reporte_cdp = $1
            WHERE m.id_cdp = (SELECT id_cdp FROM "CasasDePaz" WHERE id_lider = $2)
            ORDER BY m.nombre
            "#,
        )
        .bind(id_reporte_cdp)
        .bind(id_lider)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// The visits of a report, with follow-up state and note counts.
    pub async fn visit_detail(pool: &PgPool, id_reporte_cdp: i64) -> Result<Vec<VisitRow>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                v.id_visita,
                v.nombre,
                v.telefono,
                v.decision,
                v.tipo,
                s.id_seguimiento,
                s.estado AS estado_seguimiento,
                (SELECT COUNT(*) FROM "NotasSeguimiento" ns
                 WHERE ns.id_seguimiento = s.id_seguimiento) AS total_notas
            FROM "VisitasCdP" v
            LEFT JOIN "Seguimiento" s ON v.id_visita = s.id_visita
            WHERE v.id_reporte_cdp = $1
            ORDER BY v.id_visita
            "#,
        )
        .bind(id_reporte_cdp)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
