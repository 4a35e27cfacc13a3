//! Home-group endpoints.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use casapaz_authz::{Action, Actor, AuthzError, Target};
use casapaz_core::GroupId;
use casapaz_db::models::{Group, GroupSummary};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{AssignLeaderRequest, CreateGroupRequest, MessageResponse, UpdateGroupRequest};
use crate::services::{group_service, member_service};
use crate::Engine;

/// List the groups the actor may see.
///
/// GET /api/cdp
pub async fn list_groups_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<GroupSummary>>, ApiError> {
    let groups = group_service::list_groups(&pool, &engine, &actor).await?;
    Ok(Json(groups))
}

/// Fetch one group, scope-checked.
///
/// GET /api/cdp/{id}
pub async fn get_group_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<Group>, ApiError> {
    engine
        .authorize(&actor, Action::GroupRead, &Target::Group(GroupId::from_i64(id)))
        .await?;

    let group = Group::find_by_id(&pool, id)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Casa de Paz",
            id,
        })?;
    Ok(Json(group))
}

/// Create a group.
///
/// POST /api/admin/cdp
pub async fn create_group_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let response = group_service::create_group(&pool, &engine, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Update a group.
///
/// PUT /api/admin/cdp/{id}
pub async fn update_group_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = group_service::update_group(&pool, &engine, &actor, id, req).await?;
    Ok(Json(response))
}

/// Assign a leader to a group.
///
/// PUT /api/admin/cdp/{id}/asignar-lider
pub async fn assign_leader_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<AssignLeaderRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = group_service::assign_leader(&pool, &engine, &actor, id, req).await?;
    Ok(Json(response))
}

/// Delete a group.
///
/// DELETE /api/admin/cdp/{id}
pub async fn delete_group_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = group_service::delete_group(&pool, &engine, &actor, id).await?;
    Ok(Json(response))
}

/// The group the logged-in leader leads.
///
/// GET /api/lider/mi-cdp
pub async fn my_group_handler(
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (id_cdp, nombre) = member_service::own_group_id(&engine, &actor).await?;
    Ok(Json(MessageResponse::with_id(
        format!("Casa de Paz '{nombre}' obtenida exitosamente."),
        id_cdp,
    )))
}
