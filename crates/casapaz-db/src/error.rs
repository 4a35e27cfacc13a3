//! Error types for the casapaz-db crate.

use thiserror::Error;

/// Database operation errors.
///
/// Constraint violations are classified here so callers can map them to
/// their own taxonomy: a unique violation is a race the store of record
/// resolved (409-class), a foreign-key violation is a delete blocked by
/// dependents (the caller must clear them first, nothing cascades).
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness constraint rejected the write (SQLSTATE 23505).
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign-key constraint rejected the write (SQLSTATE 23503).
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation failed inside a database operation (e.g. a composite
    /// insert referencing rows outside the expected group).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Any other query failure.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => return DbError::UniqueViolation(db_err.message().to_string()),
                Some("23503") => {
                    return DbError::ForeignKeyViolation(db_err.message().to_string())
                }
                _ => {}
            }
        }
        DbError::QueryFailed(err)
    }
}

impl DbError {
    /// Whether this error is a uniqueness race.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_))
    }

    /// Whether this error is a delete blocked by dependent rows.
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, DbError::ForeignKeyViolation(_))
    }
}

/// Convenience Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_query_failed() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::QueryFailed(_)));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_display() {
        let err = DbError::UniqueViolation("duplicate key".to_string());
        assert_eq!(
            err.to_string(),
            "Unique constraint violated: duplicate key"
        );
        assert!(err.is_unique_violation());
    }
}
