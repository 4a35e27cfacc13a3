//! Bearer-token authentication middleware.
//!
//! Verifies the HS256 token, rebuilds the [`Actor`] the authorization
//! engine consumes, and stores both the claims and the actor in the
//! request extensions. Handlers never look at the token themselves.

use std::sync::Arc;

use axum::{body::Body, extract::Request, middleware::Next, response::Response, Extension};
use casapaz_auth::{decode_token, AuthError};
use casapaz_authz::Actor;

use crate::error::ApiError;

/// Token settings shared by the login handler and the middleware.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// HS256 signing secret.
    pub jwt_secret: Vec<u8>,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
}

/// Middleware that authenticates the request and attaches the actor.
///
/// # Errors
///
/// - `ApiError::Unauthorized` (401): missing/malformed header, invalid,
///   expired or forged token, or a token carrying an unknown role id.
pub async fn auth_middleware(
    Extension(settings): Extension<Arc<TokenSettings>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode_token(token, &settings.jwt_secret).map_err(|err| {
        match err {
            AuthError::TokenExpired => tracing::debug!("Rejected expired token"),
            other => tracing::debug!(error = %other, "Rejected token"),
        }
        ApiError::Unauthorized
    })?;

    let role = claims.role().map_err(|_| ApiError::Unauthorized)?;
    let actor = Actor {
        id: claims.user_id(),
        role,
        active: claims.activo,
    };

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use casapaz_auth::{encode_token, Claims};
    use casapaz_core::{Role, UserId};
    use tower::util::ServiceExt;

    const SECRET: &[u8] = b"middleware-test-secret";

    async fn whoami(Extension(actor): Extension<Actor>) -> String {
        format!("{}:{:?}", actor.id, actor.role)
    }

    fn app() -> Router {
        let settings = Arc::new(TokenSettings {
            jwt_secret: SECRET.to_vec(),
            token_ttl_secs: 3600,
        });
        Router::new()
            .route("/", get(whoami))
            .layer(middleware::from_fn(auth_middleware))
            .layer(Extension(settings))
    }

    fn bearer(claims: &Claims) -> String {
        format!("Bearer {}", encode_token(claims, SECRET).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token_attaches_actor() {
        let claims = Claims::new(UserId::from_i64(42), Role::GroupLeader, "Ana", true, 3600);
        let request = Request::builder()
            .uri("/")
            .header("authorization", bearer(&claims))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_header_is_401() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_token_is_401() {
        let claims = Claims::new(UserId::from_i64(42), Role::GroupLeader, "Ana", true, 3600);
        let token = encode_token(&claims, b"other-secret").unwrap();
        let request = Request::builder()
            .uri("/")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_role_is_401() {
        let mut claims = Claims::new(UserId::from_i64(42), Role::GroupLeader, "Ana", true, 3600);
        claims.rol = 99;
        let request = Request::builder()
            .uri("/")
            .header("authorization", bearer(&claims))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
