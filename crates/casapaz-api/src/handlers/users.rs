//! User administration endpoints (reserved-set actions).

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use casapaz_auth::hash_password;
use casapaz_authz::{Action, Actor, Target};
use casapaz_core::Role;
use casapaz_db::models::{UpdateUser, User, UserSummary};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{CreateUserRequest, MessageResponse, UpdateUserRequest};
use crate::Engine;

/// The bootstrap Super Admin; it can never be deactivated.
const ROOT_USER_ID: i64 = 1;

/// List every user account.
///
/// GET /api/admin/usuarios
pub async fn list_users_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    engine
        .authorize(&actor, Action::UserList, &Target::Global)
        .await?;
    Ok(Json(User::list_all(&pool).await?))
}

/// Create a user account.
///
/// POST /api/admin/usuarios
pub async fn create_user_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if req.nombre.trim().is_empty() || req.contrasena.is_empty() {
        return Err(ApiError::Validation(
            "nombre and contrasena are required".to_string(),
        ));
    }
    if Role::from_id(req.id_rol).is_none() {
        return Err(ApiError::Validation(format!(
            "id_rol {} is not a known role",
            req.id_rol
        )));
    }

    engine
        .authorize(&actor, Action::UserCreate, &Target::Global)
        .await?;

    let hash = hash_password(&req.contrasena).map_err(|e| ApiError::Internal(e.to_string()))?;
    let user = User::create(&pool, &req.nombre, &hash, req.id_rol).await?;

    tracing::info!(actor_id = %actor.id, id_usuario = user.id_usuario, "User created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_id(
            format!(
                "Usuario {} creado exitosamente con Rol ID {}.",
                user.nombre, user.id_rol
            ),
            user.id_usuario,
        )),
    ))
}

/// Update a user account (name, password, role, state).
///
/// PUT /api/admin/usuarios/{id}
pub async fn update_user_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(id_rol) = req.id_rol {
        if Role::from_id(id_rol).is_none() {
            return Err(ApiError::Validation(format!(
                "id_rol {id_rol} is not a known role"
            )));
        }
    }

    let contrasena_hash = match &req.contrasena {
        Some(contrasena) => {
            Some(hash_password(contrasena).map_err(|e| ApiError::Internal(e.to_string()))?)
        }
        None => None,
    };
    let changes = UpdateUser {
        nombre: req.nombre,
        contrasena_hash,
        id_rol: req.id_rol,
        estado: req.estado,
    };
    if changes.is_empty() {
        return Err(ApiError::Validation(
            "at least one field must be provided".to_string(),
        ));
    }

    engine
        .authorize(&actor, Action::UserUpdate, &Target::Global)
        .await?;

    let user = User::update(&pool, id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFoundMessage(format!("Usuario {id} no encontrado.")))?;

    tracing::info!(actor_id = %actor.id, id_usuario = id, "User updated");
    Ok(Json(MessageResponse::with_id(
        format!("Usuario {} (ID {id}) actualizado exitosamente.", user.nombre),
        id,
    )))
}

/// Logically deactivate a user.
///
/// DELETE /api/admin/usuarios/{id}
pub async fn deactivate_user_handler(
    Extension(pool): Extension<PgPool>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    engine
        .authorize(&actor, Action::UserDeactivate, &Target::Global)
        .await?;

    if id == ROOT_USER_ID {
        return Err(ApiError::Validation(
            "No está permitido desactivar el usuario Super Admin principal.".to_string(),
        ));
    }

    let nombre = User::deactivate(&pool, id).await?;
    tracing::info!(actor_id = %actor.id, id_usuario = id, "User deactivated");
    Ok(Json(MessageResponse::with_id(
        format!("Usuario {nombre} (ID {id}) ha sido marcado como inactivo."),
        id,
    )))
}
