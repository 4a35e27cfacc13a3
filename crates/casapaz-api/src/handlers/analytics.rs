//! Reporting and analytics endpoints.
//!
//! Global summaries are for global roles; subnet summaries are served to
//! the supervising subnet leader for their own subnet.

use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::{Extension, Json};
use casapaz_authz::{Actor, AuthzError, DenyReason};
use casapaz_core::Role;
use casapaz_db::models::analytics;
use casapaz_db::models::{MemberPhase, Network, PhaseSummary, SubnetPhaseSummary};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::DateRangeQuery;

/// Deny unless the actor holds a global role.
fn require_global(actor: &Actor) -> Result<(), ApiError> {
    if !actor.active {
        return Err(AuthzError::Denied(DenyReason::InactiveActor).into());
    }
    if !actor.role.is_global() {
        return Err(AuthzError::Denied(DenyReason::RoleNotPermitted { role: actor.role }).into());
    }
    Ok(())
}

/// Query for subnet-scoped summaries requested by a global role.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct SubnetQuery {
    #[serde(default)]
    pub id_lsr: Option<i64>,
}

/// Per-subnet metrics: a subnet leader sees their own, global roles see
/// all.
///
/// GET /api/reportes/metricas-lsr
pub async fn lsr_metrics_handler(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<analytics::LsrMetrics>>, ApiError> {
    if !actor.active {
        return Err(AuthzError::Denied(DenyReason::InactiveActor).into());
    }
    let filter = match actor.role {
        Role::SuperAdmin | Role::Administration => None,
        Role::SubnetLeader => Some(actor.id.as_i64()),
        role => {
            return Err(AuthzError::Denied(DenyReason::RoleNotPermitted { role }).into());
        }
    };
    Ok(Json(analytics::lsr_metrics(&pool, filter).await?))
}

/// Member status totals for one network.
///
/// GET /api/reportes/red/{id}/status
pub async fn network_status_handler(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<analytics::NetworkStatus>, ApiError> {
    if !actor.active {
        return Err(AuthzError::Denied(DenyReason::InactiveActor).into());
    }

    let network = Network::find_by_id(&pool, id)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Red",
            id,
        })?;

    match actor.role {
        Role::SuperAdmin | Role::Administration => {}
        // A subnet leader may consult a network where they supervise at
        // least one group.
        Role::SubnetLeader => {
            if !analytics::lsr_has_groups_in_network(&pool, actor.id.as_i64(), id).await? {
                return Err(AuthzError::Denied(DenyReason::OutsideSupervisionScope {
                    actor: actor.id,
                    group: None,
                })
                .into());
            }
        }
        role => {
            return Err(AuthzError::Denied(DenyReason::RoleNotPermitted { role }).into());
        }
    }

    tracing::debug!(id_red = id, nombre_red = %network.nombre_red, "Network status consulted");
    Ok(Json(analytics::network_status(&pool, id).await?))
}

/// Financial consolidation over a date range (global roles).
///
/// GET /api/reportes/ofrendas/resumen
pub async fn offerings_summary_handler(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<analytics::OfferingsRow>>, ApiError> {
    require_global(&actor)?;
    let rows = analytics::offerings_summary(&pool, range.fecha_inicio, range.fecha_fin).await?;
    Ok(Json(rows))
}

/// Attendance and decisions per period (global roles).
///
/// GET /api/reportes/asistencia/global
pub async fn attendance_summary_handler(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<analytics::AttendancePeriod>>, ApiError> {
    require_global(&actor)?;

    let formato = match range.periodo.as_deref().unwrap_or("month") {
        "week" => "IYYY-IW",
        "month" => "YYYY-MM",
        "year" => "YYYY",
        other => {
            return Err(ApiError::Validation(format!(
                "periodo must be week, month or year (got '{other}')"
            )));
        }
    };
    let rows =
        analytics::attendance_summary(&pool, range.fecha_inicio, range.fecha_fin, formato).await?;
    Ok(Json(rows))
}

/// Members per vision phase, system-wide (global roles).
///
/// GET /api/reportes/vision/resumen
pub async fn vision_summary_handler(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<PhaseSummary>>, ApiError> {
    require_global(&actor)?;
    Ok(Json(MemberPhase::summary_global(&pool).await?))
}

/// Active members per current phase across one subnet.
///
/// GET /api/lsr/vision/resumen
pub async fn subnet_vision_summary_handler(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<SubnetQuery>,
) -> Result<Json<Vec<SubnetPhaseSummary>>, ApiError> {
    if !actor.active {
        return Err(AuthzError::Denied(DenyReason::InactiveActor).into());
    }
    let id_lsr = match actor.role {
        Role::SubnetLeader => actor.id.as_i64(),
        Role::SuperAdmin | Role::Administration => query.id_lsr.ok_or_else(|| {
            ApiError::Validation("id_lsr is required for global roles".to_string())
        })?,
        role => {
            return Err(AuthzError::Denied(DenyReason::RoleNotPermitted { role }).into());
        }
    };
    Ok(Json(
        MemberPhase::summary_by_subnet_leader(&pool, id_lsr).await?,
    ))
}
