//! Network management endpoints (reserved-set actions).

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use casapaz_authz::{ensure_no_dependents, Action, Actor, AuthzError, Target};
use casapaz_db::models::{Network, NetworkSummary};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{MessageResponse, NetworkRequest};
use crate::Engine;

/// List all networks with their group counts.
///
/// GET /api/admin/redes
pub async fn list_networks_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<NetworkSummary>>, ApiError> {
    engine
        .authorize(&actor, Action::NetworkList, &Target::Global)
        .await?;
    Ok(Json(Network::list_with_group_counts(&pool).await?))
}

/// Create a network.
///
/// POST /api/admin/redes
pub async fn create_network_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<NetworkRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if req.nombre_red.trim().is_empty() {
        return Err(ApiError::Validation("nombre_red is required".to_string()));
    }

    engine
        .authorize(&actor, Action::NetworkCreate, &Target::Global)
        .await?;

    let network = Network::create(&pool, &req.nombre_red).await?;
    tracing::info!(actor_id = %actor.id, id_red = network.id_red, "Network created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            format!("Red '{}' creada exitosamente.", network.nombre_red),
            network.id_red,
        )),
    ))
}

/// Rename a network.
///
/// PUT /api/admin/redes/{id}
pub async fn update_network_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<NetworkRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if req.nombre_red.trim().is_empty() {
        return Err(ApiError::Validation("nombre_red is required".to_string()));
    }

    engine
        .authorize(&actor, Action::NetworkUpdate, &Target::Global)
        .await?;

    let network = Network::rename(&pool, id, &req.nombre_red)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Red",
            id,
        })?;

    Ok(Json(MessageResponse::with_id(
        format!(
            "Red (ID {id}) actualizada a '{}' exitosamente.",
            network.nombre_red
        ),
        id,
    )))
}

/// Delete a network, blocked while groups reference it.
///
/// DELETE /api/admin/redes/{id}
pub async fn delete_network_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    engine
        .authorize(&actor, Action::NetworkDelete, &Target::Global)
        .await?;

    let network = Network::find_by_id(&pool, id)
        .await?
        .ok_or(AuthzError::NotFound {
            resource: "Red",
            id,
        })?;

    let groups = Network::count_groups(&pool, id).await?;
    ensure_no_dependents("Red", id, "Casas de Paz", groups)?;

    Network::delete(&pool, id).await?;
    tracing::info!(actor_id = %actor.id, id_red = id, "Network deleted");
    Ok(Json(MessageResponse::with_id(
        format!(
            "Red '{}' (ID {id}) eliminada permanentemente.",
            network.nombre_red
        ),
        id,
    )))
}
