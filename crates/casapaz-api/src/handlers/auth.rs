//! Authentication endpoint.

use std::sync::Arc;

use axum::{Extension, Json};
use casapaz_auth::{encode_token, verify_password, Claims};
use casapaz_authz::{AuthzError, DenyReason};
use casapaz_db::models::User;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::middleware::TokenSettings;
use crate::models::{LoginRequest, LoginResponse, UserInfo};

/// Log in with name and password, receiving a bearer token.
///
/// POST /api/auth/login
///
/// Credentials are verified against the stored Argon2id hash only; an
/// inactive account is rejected as a denial, not as bad credentials.
pub async fn login_handler(
    Extension(pool): Extension<PgPool>,
    Extension(settings): Extension<Arc<TokenSettings>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.nombre.trim().is_empty() || req.contrasena.is_empty() {
        return Err(ApiError::Validation(
            "nombre and contrasena are required".to_string(),
        ));
    }

    let user = User::find_by_nombre(&pool, &req.nombre)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let matches = verify_password(&req.contrasena, &user.contrasena_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;
    if !matches {
        tracing::debug!(nombre = %req.nombre, "Login rejected: bad password");
        return Err(ApiError::InvalidCredentials);
    }

    if !user.estado {
        return Err(AuthzError::Denied(DenyReason::InactiveActor).into());
    }

    let role = user
        .role()
        .ok_or_else(|| ApiError::Internal(format!("user {} carries unknown role", user.id_usuario)))?;

    let claims = Claims::new(
        user.user_id(),
        role,
        &user.nombre,
        user.estado,
        settings.token_ttl_secs,
    );
    let token = encode_token(&claims, &settings.jwt_secret)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(id_usuario = user.id_usuario, "Login succeeded");

    Ok(Json(LoginResponse {
        mensaje: "Inicio de sesión exitoso.".to_string(),
        token,
        usuario: UserInfo {
            id_usuario: user.id_usuario,
            nombre: user.nombre,
            id_rol: role.id(),
            nombre_rol: role.nombre().to_string(),
        },
    }))
}
