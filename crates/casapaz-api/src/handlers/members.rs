//! Member endpoints.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use casapaz_authz::{Action, Actor, Target};
use casapaz_core::GroupId;
use casapaz_db::models::{Member, MemberSummary, VisionPhase};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{
    CreateMemberRequest, MemberPhaseRequest, MemberResponse, MessageResponse,
    ReassignMemberRequest, UpdateMemberRequest,
};
use crate::services::member_service;
use crate::Engine;

/// List the members the actor may see.
///
/// GET /api/miembros
pub async fn list_members_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<MemberSummary>>, ApiError> {
    let members = member_service::list_members(&pool, &engine, &actor).await?;
    Ok(Json(members))
}

/// The members of one group, scope-checked against its chain.
///
/// GET /api/cdp/{id}/miembros
pub async fn list_group_members_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    engine
        .authorize(&actor, Action::MemberList, &Target::Group(GroupId::from_i64(id)))
        .await?;

    let members = Member::list_by_group(&pool, id).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// Fetch one member.
///
/// GET /api/miembros/{id}
pub async fn get_member_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = member_service::get_member(&pool, &engine, &actor, id).await?;
    Ok(Json(member))
}

/// Register a member.
///
/// POST /api/miembros
pub async fn create_member_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let member = member_service::create_member(&pool, &engine, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Update a member.
///
/// PUT /api/miembros/{id}
pub async fn update_member_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = member_service::update_member(&pool, &engine, &actor, id, req).await?;
    Ok(Json(member))
}

/// Move a member to another group.
///
/// PUT /api/miembros/{id}/reasignar
pub async fn reassign_member_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<ReassignMemberRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = member_service::reassign_member(&pool, &engine, &actor, id, req).await?;
    Ok(Json(member))
}

/// Soft delete (deactivate) a member.
///
/// DELETE /api/miembros/{id}
pub async fn deactivate_member_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = member_service::deactivate_member(&pool, &engine, &actor, id).await?;
    Ok(Json(response))
}

/// Permanently delete a member (global roles only).
///
/// DELETE /api/admin/miembros/{id}
pub async fn hard_delete_member_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = member_service::hard_delete_member(&pool, &engine, &actor, id).await?;
    Ok(Json(response))
}

/// Record a member's vision-phase approval.
///
/// POST /api/admin/miembros/fase
pub async fn update_member_phase_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<MemberPhaseRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let response = member_service::update_member_phase(&pool, &engine, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// The vision-phase catalog (for selectors).
///
/// GET /api/catalogos/fases
pub async fn list_phases_handler(
    Extension(pool): Extension<PgPool>,
) -> Result<Json<Vec<VisionPhase>>, ApiError> {
    Ok(Json(VisionPhase::list(&pool).await?))
}
