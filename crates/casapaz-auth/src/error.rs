//! Error types for authentication operations.

use thiserror::Error;

/// Authentication error types.
///
/// Explicit variants so callers can distinguish an expired token from a
/// forged one, and a hashing failure from a plain mismatch.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Token has expired (exp claim is in the past).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature is invalid.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token format is malformed or invalid.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The role id carried in the token does not exist.
    #[error("Unknown role id in token: {0}")]
    UnknownRole(i16),

    /// Password hashing operation failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Password hash format is invalid.
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(AuthError::TokenExpired.to_string(), "Token has expired");
        assert_eq!(
            AuthError::UnknownRole(9).to_string(),
            "Unknown role id in token: 9"
        );
    }
}
