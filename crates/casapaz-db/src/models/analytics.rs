//! Reporting and analytics queries.
//!
//! Read-only consolidations over the hierarchy. Scoping is decided by
//! the caller: the subnet variants take the supervisor id, the global
//! variants are for global roles only.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::Result;

/// Per-subnet totals: groups, members, activity rate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LsrMetrics {
    pub id_lsr: i64,
    pub nombre_lsr: String,
    pub total_casas_de_paz: i64,
    pub total_miembros: i64,
    pub miembros_activos: i64,
    pub miembros_inactivos: i64,
    pub tasa_inactividad_porcentaje: Decimal,
}

/// Member status totals for one network.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NetworkStatus {
    pub total_miembros: i64,
    pub miembros_activos: i64,
    pub miembros_inactivos: i64,
}

/// Financial totals per leader over a date range.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OfferingsRow {
    pub id_lider: i64,
    pub nombre_lider: String,
    pub nombre_lsr: Option<String>,
    pub total_ofrendas: Decimal,
    pub total_diezmos: Decimal,
    pub total_pactos: Decimal,
    pub total_primicias: Decimal,
    pub total_reportes: i64,
}

/// Attendance and decisions consolidated per calendar period.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendancePeriod {
    pub periodo: String,
    pub total_reportes: i64,
    pub total_asistencia: i64,
    pub total_conversiones: i64,
    pub total_reconciliaciones: i64,
}

/// Subnet metrics, optionally narrowed to a single supervisor.
pub async fn lsr_metrics(pool: &PgPool, only_lsr: Option<i64>) -> Result<Vec<LsrMetrics>> {
    let rows = sqlx::query_as(
        r#"
        WITH LsrCdpStats AS (
            SELECT cdp.id_lsr, COUNT(cdp.id_cdp) AS total_cdp
            FROM "CasasDePaz" cdp
            GROUP BY cdp.id_lsr
        ),
        LsrMiembroStats AS (
            SELECT
                cdp.id_lsr,
                COUNT(m.id_miembro) AS total_miembros,
                COUNT(m.id_miembro) FILTER (WHERE m.estado = 'Activo') AS miembros_activos,
                COUNT(m.id_miembro) FILTER (WHERE m.estado = 'Inactivo') AS miembros_inactivos
            FROM "Miembros" m
            JOIN "CasasDePaz" cdp ON m.id_cdp = cdp.id_cdp
            GROUP BY cdp.id_lsr
        )
        SELECT
            u.id_usuario AS id_lsr,
            u.nombre AS nombre_lsr,
            COALESCE(s.total_cdp, 0)::bigint AS total_casas_de_paz,
            COALESCE(ms.total_miembros, 0)::bigint AS total_miembros,
            COALESCE(ms.miembros_activos, 0)::bigint AS miembros_activos,
            COALESCE(ms.miembros_inactivos, 0)::bigint AS miembros_inactivos,
            CASE
                WHEN COALESCE(ms.total_miembros, 0) = 0 THEN 0.0
                ELSE ROUND(
                    (COALESCE(ms.miembros_inactivos, 0)::numeric / ms.total_miembros) * 100, 2
                )
            END AS tasa_inactividad_porcentaje
        FROM "Usuarios" u
        LEFT JOIN LsrCdpStats s ON u.id_usuario = s.id_lsr
        LEFT JOIN LsrMiembroStats ms ON u.id_usuario = ms.id_lsr
        WHERE u.id_rol = 4
          AND ($1::bigint IS NULL OR u.id_usuario = $1)
        ORDER BY u.nombre
        "#,
    )
    .bind(only_lsr)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Member status totals for one network.
pub async fn network_status(pool: &PgPool, id_red: i64) -> Result<NetworkStatus> {
    let status = sqlx::query_as(
        r#"
        SELECT
            COUNT(m.id_miembro) AS total_miembros,
            COUNT(m.id_miembro) FILTER (WHERE m.estado = 'Activo') AS miembros_activos,
            COUNT(m.id_miembro) FILTER (WHERE m.estado = 'Inactivo') AS miembros_inactivos
        FROM "Miembros" m
        JOIN "CasasDePaz" cdp ON m.id_cdp = cdp.id_cdp
        WHERE cdp.id_red = $1
        "#,
    )
    .bind(id_red)
    .fetch_one(pool)
    .await?;
    Ok(status)
}

/// Whether a subnet leader supervises at least one group in a network.
pub async fn lsr_has_groups_in_network(pool: &PgPool, id_lsr: i64, id_red: i64) -> Result<bool> {
    let exists: Option<(i32,)> = sqlx::query_as(
        r#"
        SELECT 1 FROM "CasasDePaz"
        WHERE id_lsr = $1 AND id_red = $2
        LIMIT 1
        "#,
    )
    .bind(id_lsr)
    .bind(id_red)
    .fetch_optional(pool)
    .await?;
    Ok(exists.is_some())
}

/// Financial totals per leader over a date range, largest first.
pub async fn offerings_summary(
    pool: &PgPool,
    fecha_inicio: NaiveDate,
    fecha_fin: NaiveDate,
) -> Result<Vec<OfferingsRow>> {
    let rows = sqlx::query_as(
        r#"
        SELECT
            rc.id_lider,
            u.nombre AS nombre_lider,
            lsr.nombre AS nombre_lsr,
            SUM(rc.ofrendas) AS total_ofrendas,
            SUM(rc.diezmos) AS total_diezmos,
            SUM(rc.pactos) AS total_pactos,
            SUM(rc.primicias) AS total_primicias,
            COUNT(rc.id_reporte_cdp) AS total_reportes
        FROM "ReporteCdP" rc
        JOIN "Usuarios" u ON rc.id_lider = u.id_usuario
        JOIN "CasasDePaz" cdp ON rc.id_lider = cdp.id_lider
        LEFT JOIN "Usuarios" lsr ON cdp.id_lsr = lsr.id_usuario
        WHERE rc.fecha_reporte BETWEEN $1 AND $2
        GROUP BY rc.id_lider, u.nombre, lsr.nombre
        ORDER BY total_ofrendas DESC
        "#,
    )
    .bind(fecha_inicio)
    .bind(fecha_fin)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Attendance and decisions per period. `formato` is the Postgres
/// `TO_CHAR` pattern for the grouping bucket (e.g. `YYYY-MM`).
pub async fn attendance_summary(
    pool: &PgPool,
    fecha_inicio: NaiveDate,
    fecha_fin: NaiveDate,
    formato: &str,
) -> Result<Vec<AttendancePeriod>> {
    let rows = sqlx::query_as(
        r#"
        SELECT
            t.periodo,
            COUNT(*) AS total_reportes,
            SUM(t.asistencia)::bigint AS total_asistencia,
            SUM(t.conversiones)::bigint AS total_conversiones,
            SUM(t.reconciliaciones)::bigint AS total_reconciliaciones
        FROM (
            SELECT
                TO_CHAR(rc.fecha_reporte, $3) AS periodo,
                (SELECT COUNT(*) FROM "AsistenciaCdP" a
                 WHERE a.id_reporte_cdp = rc.id_reporte_cdp AND a.asistio) AS asistencia,
                (SELECT COUNT(*) FROM "VisitasCdP" v
                 WHERE v.id_reporte_cdp = rc.id_reporte_cdp
                   AND v.decision = 'Conversion') AS conversiones,
                (SELECT COUNT(*) FROM "VisitasCdP" v
                 WHERE v.id_reporte_cdp = rc.id_reporte_cdp
                   AND v.decision = 'Reconciliacion') AS reconciliaciones
            FROM "ReporteCdP" rc
            WHERE rc.fecha_reporte BETWEEN $1 AND $2
        ) t
        GROUP BY t.periodo
        ORDER BY t.periodo
        "#,
    )
    .bind(fecha_inicio)
    .bind(fecha_fin)
    .bind(formato)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
