//! Central service report model (`ReporteServicio`).

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use crate::error::Result;

/// An attendance report for a central service.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceReport {
    pub id_reporte_servicio: i64,
    pub id_lider_servicio: i64,
    pub fecha_reporte: NaiveDate,
    pub total: i32,
    pub convertidos: i32,
    pub reconciliados: i32,
    pub datos_areas_json: serde_json::Value,
}

impl ServiceReport {
    /// Record a service report.
    pub async fn create(
        pool: &PgPool,
        id_lider_servicio: i64,
        fecha_reporte: NaiveDate,
        total: i32,
        convertidos: i32,
        reconciliados: i32,
        datos_areas_json: &serde_json::Value,
    ) -> Result<Self> {
        let report = sqlx::query_as(
            r#"
            INSERT INTO "ReporteServicio" (
                id_lider_servicio, fecha_reporte, total,
                convertidos, reconciliados, datos_areas_json
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id_lider_servicio)
        .bind(fecha_reporte)
        .bind(total)
        .bind(convertidos)
        .bind(reconciliados)
        .bind(datos_areas_json)
        .fetch_one(pool)
        .await?;
        Ok(report)
    }
}
