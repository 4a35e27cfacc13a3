//! Error types for the casapaz HTTP surface.
//!
//! Every failure renders an RFC 7807 problem document carrying the
//! stable machine-readable code from the authorization taxonomy. The
//! 403-vs-404 distinction is preserved end-to-end: a scoped lookup that
//! finds the row but fails the scope check is Forbidden, never Not
//! Found.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use casapaz_authz::{AssignmentViolation, AuthzError};
use casapaz_db::DbError;
use serde::Serialize;
use utoipa::ToSchema;

/// Error type for the casapaz API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Authentication required or the token is unusable.
    #[error("Authentication required")]
    Unauthorized,

    /// Bad credentials at login.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Input validation failure with the offending field's name.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A missing resource reported with a pre-formatted message.
    #[error("{0}")]
    NotFoundMessage(String),

    /// An authorization or mutation-guard outcome.
    #[error(transparent)]
    Authz(#[from] AuthzError),

    /// A database failure.
    #[error(transparent)]
    Database(DbError),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(msg) => ApiError::Authz(AuthzError::Conflict(msg)),
            DbError::NotFound(msg) => ApiError::NotFoundMessage(msg),
            other => ApiError::Database(other),
        }
    }
}

/// RFC 7807 problem details response format.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    /// Stable machine-readable reason code.
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProblemDetails {
    fn new(status: StatusCode, title: &str, code: &str, detail: String) -> Self {
        Self {
            problem_type: format!("https://casapaz.dev/problems/{code}"),
            title: title.to_string(),
            status: status.as_u16(),
            code: code.to_string(),
            detail: Some(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, problem) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ProblemDetails::new(
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized",
                    "unauthorized",
                    "Missing or invalid authentication token".to_string(),
                ),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ProblemDetails::new(
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized",
                    "invalid_credentials",
                    "Invalid user or password".to_string(),
                ),
            ),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ProblemDetails::new(
                    StatusCode::BAD_REQUEST,
                    "Validation Error",
                    "validation_error",
                    msg.clone(),
                ),
            ),
            ApiError::NotFoundMessage(msg) => (
                StatusCode::NOT_FOUND,
                ProblemDetails::new(
                    StatusCode::NOT_FOUND,
                    "Not Found",
                    "not_found",
                    msg.clone(),
                ),
            ),
            ApiError::Authz(err) => {
                let status = match err {
                    AuthzError::NotFound { .. } => StatusCode::NOT_FOUND,
                    AuthzError::Denied(_) => StatusCode::FORBIDDEN,
                    AuthzError::InvalidAssignment(violation) => match violation {
                        // The store of record treats a doubly-assigned
                        // leader as a conflict; mirror that here.
                        AssignmentViolation::LeaderAlreadyAssigned { .. } => StatusCode::CONFLICT,
                        _ => StatusCode::BAD_REQUEST,
                    },
                    AuthzError::DependencyConflict { .. } | AuthzError::Conflict(_) => {
                        StatusCode::CONFLICT
                    }
                    AuthzError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %err, "Hierarchy store failure");
                }
                let title = match status {
                    StatusCode::NOT_FOUND => "Not Found",
                    StatusCode::FORBIDDEN => "Forbidden",
                    StatusCode::CONFLICT => "Conflict",
                    StatusCode::BAD_REQUEST => "Invalid Assignment",
                    _ => "Internal Server Error",
                };
                (
                    status,
                    ProblemDetails::new(status, title, err.code(), err.to_string()),
                )
            }
            ApiError::Database(err) => {
                let (status, code, detail) = match err {
                    DbError::ForeignKeyViolation(_) => (
                        StatusCode::CONFLICT,
                        "dependency_conflict",
                        "Dependent rows reference this resource; reassign or clear them first"
                            .to_string(),
                    ),
                    DbError::ValidationFailed(msg) => {
                        (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
                    }
                    other => {
                        tracing::error!(error = %other, "Database error");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "internal_error",
                            "A database error occurred".to_string(),
                        )
                    }
                };
                let title = match status {
                    StatusCode::CONFLICT => "Conflict",
                    StatusCode::BAD_REQUEST => "Validation Error",
                    _ => "Internal Server Error",
                };
                (status, ProblemDetails::new(status, title, code, detail))
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ProblemDetails::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error",
                        "internal_error",
                        "An internal error occurred".to_string(),
                    ),
                )
            }
        };

        (status, Json(problem)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casapaz_authz::DenyReason;
    use casapaz_core::{GroupId, UserId};

    #[test]
    fn test_denied_maps_to_403_not_404() {
        let err = ApiError::Authz(AuthzError::Denied(DenyReason::OutsideSupervisionScope {
            actor: UserId::from_i64(10),
            group: Some(GroupId::from_i64(9)),
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::Authz(AuthzError::NotFound {
            resource: "Miembro",
            id: 9,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_leader_already_assigned_is_a_conflict() {
        let err = ApiError::Authz(AuthzError::InvalidAssignment(
            AssignmentViolation::LeaderAlreadyAssigned {
                user: UserId::from_i64(5),
                group: GroupId::from_i64(3),
            },
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err: ApiError = DbError::UniqueViolation("duplicate".to_string()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_store_unavailable_is_500() {
        let err = ApiError::Authz(AuthzError::StoreUnavailable(
            casapaz_authz::StoreError::Unavailable("down".to_string()),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
