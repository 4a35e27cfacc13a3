//! JWT claims for authenticated casapaz users.
//!
//! Standard RFC 7519 claims plus the backend-specific claims the
//! authorization layer needs: the numeric role id and the account's
//! active flag. The claims are the only thing the core trusts about a
//! caller once the signature has been verified.

use casapaz_core::{Role, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// JWT claims carried by every issued token.
///
/// # Example
///
/// ```
/// use casapaz_auth::Claims;
/// use casapaz_core::{Role, UserId};
///
/// let claims = Claims::new(UserId::from_i64(42), Role::GroupLeader, "Ana", true, 3600);
/// assert_eq!(claims.sub, 42);
/// assert_eq!(claims.role().unwrap(), Role::GroupLeader);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject - the user id (`Usuarios.id_usuario`).
    pub sub: i64,

    /// Numeric role id (`Usuarios.id_rol`).
    pub rol: i16,

    /// The user's display name.
    pub nombre: String,

    /// Whether the account was active when the token was issued.
    pub activo: bool,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued at as Unix timestamp.
    pub iat: i64,

    /// JWT ID - unique identifier for this token.
    pub jti: String,
}

impl Claims {
    /// Build claims for a user, expiring `ttl_secs` from now.
    #[must_use]
    pub fn new(user: UserId, role: Role, nombre: &str, activo: bool, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.as_i64(),
            rol: role.id(),
            nombre: nombre.to_string(),
            activo,
            exp: now + ttl_secs,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// The subject as a typed user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_i64(self.sub)
    }

    /// The role, or an error if the token carries an unknown role id.
    pub fn role(&self) -> Result<Role, AuthError> {
        Role::from_id(self.rol).ok_or(AuthError::UnknownRole(self.rol))
    }
}
