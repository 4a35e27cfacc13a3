//! Authentication primitives for the casapaz backend.
//!
//! This crate provides:
//! - HS256 JWT encoding and decoding with the backend's claims
//! - Argon2id password hashing (hash-only verification, no plaintext path)
//!
//! # Example
//!
//! ```
//! use casapaz_auth::{decode_token, encode_token, hash_password, verify_password, Claims};
//! use casapaz_core::{Role, UserId};
//!
//! let secret = b"example-secret";
//! let claims = Claims::new(UserId::from_i64(42), Role::GroupLeader, "Ana", true, 3600);
//!
//! let token = encode_token(&claims, secret).unwrap();
//! let decoded = decode_token(&token, secret).unwrap();
//! assert_eq!(decoded.sub, 42);
//!
//! let hash = hash_password("my-secure-password").unwrap();
//! assert!(verify_password("my-secure-password", &hash).unwrap());
//! ```

mod claims;
mod error;
mod jwt;
mod password;

pub use claims::Claims;
pub use error::AuthError;
pub use jwt::{decode_token, encode_token};
pub use password::{hash_password, verify_password, PasswordHasher};
