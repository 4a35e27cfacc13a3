//! User account model (`Usuarios`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use casapaz_core::{Role, UserId};

use crate::error::{DbError, Result};

/// A user account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Unique identifier.
    pub id_usuario: i64,

    /// Login name (unique).
    pub nombre: String,

    /// Argon2id password hash (PHC format).
    pub contrasena_hash: String,

    /// Numeric role id, references `Roles`.
    pub id_rol: i16,

    /// Whether the account is active (false = logically deleted).
    pub estado: bool,

    /// When the account was created.
    pub fecha_creacion: DateTime<Utc>,
}

/// Allow-listed updatable fields for a user.
///
/// Column names never come from callers; absent fields keep their
/// current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub nombre: Option<String>,
    pub contrasena_hash: Option<String>,
    pub id_rol: Option<i16>,
    pub estado: Option<bool>,
}

impl UpdateUser {
    /// Whether the update carries any change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.contrasena_hash.is_none()
            && self.id_rol.is_none()
            && self.estado.is_none()
    }
}

/// A user row as shown in administrative listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSummary {
    pub id_usuario: i64,
    pub nombre: String,
    pub nombre_rol: String,
    pub estado: bool,
    pub fecha_creacion: DateTime<Utc>,
    /// The group this user leads, when they lead one.
    pub cdp_asignada: Option<String>,
}

impl User {
    /// The id as a typed `UserId`.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_i64(self.id_usuario)
    }

    /// The role tag, if the stored id is a known role.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.id_rol)
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let user = sqlx::query_as(r#"SELECT * FROM "Usuarios" WHERE id_usuario = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Find a user by login name.
    pub async fn find_by_nombre(pool: &PgPool, nombre: &str) -> Result<Option<Self>> {
        let user = sqlx::query_as(r#"SELECT * FROM "Usuarios" WHERE nombre = $1"#)
            .bind(nombre)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// List all users with their role name and led group, if any.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<UserSummary>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                u.id_usuario,
                u.nombre,
                r.nombre_rol,
                u.estado,
                u.fecha_creacion,
                c.nombre_lider_cdp AS cdp_asignada
            FROM "Usuarios" u
            JOIN "Roles" r ON u.id_rol = r.id_rol
            LEFT JOIN "CasasDePaz" c ON u.id_usuario = c.id_lider
            ORDER BY u.id_usuario ASC
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Create a user. A duplicate name surfaces as
    /// [`DbError::UniqueViolation`].
    pub async fn create(
        pool: &PgPool,
        nombre: &str,
        contrasena_hash: &str,
        id_rol: i16,
    ) -> Result<Self> {
        let user = sqlx::query_as(
            r#"
            INSERT INTO "Usuarios" (nombre, contrasena_hash, id_rol, estado)
            VALUES ($1, $2, $3, TRUE)
            RETURNING *
            "#,
        )
        .bind(nombre)
        .bind(contrasena_hash)
        .bind(id_rol)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    /// Apply an allow-listed partial update.
    pub async fn update(pool: &PgPool, id: i64, changes: &UpdateUser) -> Result<Option<Self>> {
        let user = sqlx::query_as(
            r#"
            UPDATE "Usuarios"
            SET nombre = COALESCE($2, nombre),
                contrasena_hash = COALESCE($3, contrasena_hash),
                id_rol = COALESCE($4, id_rol),
                estado = COALESCE($5, estado)
            WHERE id_usuario = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.nombre)
        .bind(&changes.contrasena_hash)
        .bind(changes.id_rol)
        .bind(changes.estado)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    /// Logically deactivate a user (`estado = FALSE`). Returns the name
    /// of the deactivated account.
    pub async fn deactivate(pool: &PgPool, id: i64) -> Result<String> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            UPDATE "Usuarios" SET estado = FALSE
            WHERE id_usuario = $1
            RETURNING nombre
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(|(nombre,)| nombre)
            .ok_or_else(|| DbError::NotFound(format!("Usuario {id}")))
    }

    /// Change a user's role (promotion/demotion).
    pub async fn set_role(pool: &PgPool, id: i64, id_rol: i16) -> Result<Option<Self>> {
        let user = sqlx::query_as(
            r#"
            UPDATE "Usuarios" SET id_rol = $2
            WHERE id_usuario = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(id_rol)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        let user = User {
            id_usuario: 42,
            nombre: "Ana".to_string(),
            contrasena_hash: "$argon2id$...".to_string(),
            id_rol: 5,
            estado: true,
            fecha_creacion: Utc::now(),
        };
        assert_eq!(user.user_id(), UserId::from_i64(42));
        assert_eq!(user.role(), Some(Role::GroupLeader));
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());
        let update = UpdateUser {
            estado: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
