//! Weekly report and service report endpoints.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use casapaz_authz::{Action, Actor, Target};
use casapaz_db::models::{ReportSummary, ServiceReport};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{
    CreateFullReportRequest, CreatedReportResponse, MessageResponse, ReportDetailResponse,
    ServiceReportRequest,
};
use crate::services::report_service;
use crate::Engine;

/// Create the composite weekly report atomically.
///
/// POST /api/reportes/cdp
pub async fn create_full_report_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateFullReportRequest>,
) -> Result<(StatusCode, Json<CreatedReportResponse>), ApiError> {
    let response = report_service::create_full_report(&pool, &engine, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Report history, scoped to the actor.
///
/// GET /api/reportes/cdp
pub async fn list_reports_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ReportSummary>>, ApiError> {
    let reports = report_service::list_reports(&pool, &engine, &actor).await?;
    Ok(Json(reports))
}

/// Full detail of one report.
///
/// GET /api/reportes/cdp/{id}
pub async fn report_detail_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<ReportDetailResponse>, ApiError> {
    let detail = report_service::report_detail(&pool, &engine, &actor, id).await?;
    Ok(Json(detail))
}

/// Record a central service report.
///
/// POST /api/reportes/servicio
pub async fn create_service_report_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<ServiceReportRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if req.total < 0 {
        return Err(ApiError::Validation(
            "total must be a non-negative integer".to_string(),
        ));
    }

    engine
        .authorize(&actor, Action::ServiceReportCreate, &Target::Global)
        .await?;

    let report = ServiceReport::create(
        &pool,
        actor.id.as_i64(),
        req.fecha_reporte,
        req.total,
        req.convertidos.unwrap_or(0),
        req.reconciliados.unwrap_or(0),
        &req.datos_areas_json,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            "Reporte de Servicio creado exitosamente.".to_string(),
            report.id_reporte_servicio,
        )),
    ))
}
