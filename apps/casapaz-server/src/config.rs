//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading: required variables must be present and valid, or
//! startup stops with a clear error.

use std::env;
use thiserror::Error;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,

    /// Bind host (default 0.0.0.0).
    pub host: String,

    /// Bind port (default 3000).
    pub port: u16,

    /// HS256 signing secret for issued tokens.
    pub jwt_secret: String,

    /// Token lifetime in seconds (default 8 hours).
    pub token_ttl_secs: i64,

    /// Whether Administration holds the Super-Admin-reserved rights.
    /// Default false (strict policy).
    pub administration_has_global_rights: bool,

    /// Log filter directive (default "info").
    pub rust_log: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::InvalidValue {
                var: "JWT_SECRET".to_string(),
                message: "must be at least 32 bytes".to_string(),
            });
        }

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|e| ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: format!("{e}"),
            })?,
            Err(_) => 3000,
        };

        let token_ttl_secs = match env::var("TOKEN_TTL_SECS") {
            Ok(value) => value.parse().map_err(|e| ConfigError::InvalidValue {
                var: "TOKEN_TTL_SECS".to_string(),
                message: format!("{e}"),
            })?,
            Err(_) => 8 * 3600,
        };

        let administration_has_global_rights = env::var("ADMINISTRATION_HAS_GLOBAL_RIGHTS")
            .map(|value| matches!(value.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl_secs,
            administration_has_global_rights,
            rust_log,
        })
    }
}

fn required(var: &str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_var_fails() {
        let err = required("CASAPAZ_DOES_NOT_EXIST").unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
        assert!(err.to_string().contains("CASAPAZ_DOES_NOT_EXIST"));
    }
}
