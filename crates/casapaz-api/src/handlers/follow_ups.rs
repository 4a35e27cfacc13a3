//! Follow-up endpoints.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use casapaz_authz::Actor;
use casapaz_db::models::PendingFollowUp;
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::{AddNoteRequest, FollowUpDetailResponse, MessageResponse, StartFollowUpRequest};
use crate::services::follow_up_service;
use crate::Engine;

/// Change the state of a follow-up.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FollowUpEstadoRequest {
    pub estado: String,
}

/// Start a follow-up for a visit.
///
/// POST /api/seguimientos
pub async fn start_follow_up_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<StartFollowUpRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let response =
        follow_up_service::start_follow_up(&pool, &engine, &actor, req.id_visita).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Append a note.
///
/// POST /api/seguimientos/{id}/notas
pub async fn add_note_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<AddNoteRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let response = follow_up_service::add_note(&pool, &engine, &actor, id, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Close or reopen a follow-up.
///
/// PUT /api/seguimientos/{id}/estado
pub async fn set_estado_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<FollowUpEstadoRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response =
        follow_up_service::set_follow_up_estado(&pool, &engine, &actor, id, &req.estado).await?;
    Ok(Json(response))
}

/// Follow-up detail with the full note history.
///
/// GET /api/seguimientos/{id}
pub async fn follow_up_detail_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<FollowUpDetailResponse>, ApiError> {
    let detail = follow_up_service::follow_up_detail(&pool, &engine, &actor, id).await?;
    Ok(Json(detail))
}

/// Visits pending follow-up in the actor's scope.
///
/// GET /api/seguimientos/pendientes
pub async fn pending_follow_ups_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<PendingFollowUp>>, ApiError> {
    let rows = follow_up_service::pending_follow_ups(&pool, &engine, &actor).await?;
    Ok(Json(rows))
}
