//! HS256 token encoding and decoding.
//!
//! The deployment carries a single signing secret; there is no key
//! rotation surface here.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::Claims;
use crate::error::AuthError;

/// Encode claims into a signed HS256 token.
pub fn encode_token(claims: &Claims, secret: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Decode and validate a token, returning its claims.
///
/// Expiration is always validated; an expired token is reported as
/// [`AuthError::TokenExpired`], distinct from a forged or malformed one.
pub fn decode_token(token: &str, secret: &[u8]) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::InvalidToken(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use casapaz_core::{Role, UserId};

    const SECRET: &[u8] = b"test-secret-not-for-production";

    #[test]
    fn test_encode_decode_roundtrip() {
        let claims = Claims::new(UserId::from_i64(42), Role::GroupLeader, "Ana", true, 3600);
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let claims = Claims::new(UserId::from_i64(1), Role::SuperAdmin, "Root", true, 3600);
        let token = encode_token(&claims, SECRET).unwrap();
        let err = decode_token(&token, b"other-secret").unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let mut claims = Claims::new(UserId::from_i64(1), Role::SuperAdmin, "Root", true, 3600);
        claims.iat -= 7200;
        claims.exp -= 7200;
        let token = encode_token(&claims, SECRET).unwrap();
        let err = decode_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn test_garbage_is_invalid_token() {
        let err = decode_token("not.a.token", SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
