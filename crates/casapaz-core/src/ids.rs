//! Strongly Typed Identifiers
//!
//! This module provides type-safe identifier types for the casapaz backend.
//! Using the newtype pattern, these types prevent accidental misuse of
//! different ID types at compile time. All identifiers wrap the `i64`
//! surrogate keys assigned by the relational store (BIGSERIAL columns);
//! they are never generated in-process.
//!
//! # Example
//!
//! ```
//! use casapaz_core::{GroupId, UserId};
//!
//! let leader = UserId::from_i64(42);
//! let group = GroupId::from_i64(7);
//!
//! // Type safety: cannot pass a UserId where a GroupId is expected
//! fn requires_group(id: GroupId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_group(group);
//! // requires_group(leader); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying integer parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an ID from a raw store key.
            #[must_use]
            pub const fn from_i64(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying store key.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<i64>()
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for user accounts (`Usuarios.id_usuario`).
    ///
    /// A user's structural position (leads a group, supervises a subnet)
    /// is never derived from this id alone; it is resolved through the
    /// hierarchy store.
    UserId
);

define_id!(
    /// Strongly typed identifier for networks (`Redes.id_red`).
    NetworkId
);

define_id!(
    /// Strongly typed identifier for home groups (`CasasDePaz.id_cdp`).
    GroupId
);

define_id!(
    /// Strongly typed identifier for members (`Miembros.id_miembro`).
    MemberId
);

define_id!(
    /// Strongly typed identifier for weekly group reports
    /// (`ReporteCdP.id_reporte_cdp`).
    ReportId
);

define_id!(
    /// Strongly typed identifier for guest visits (`VisitasCdP.id_visita`).
    VisitId
);

define_id!(
    /// Strongly typed identifier for follow-ups (`Seguimiento.id_seguimiento`).
    FollowUpId
);

define_id!(
    /// Strongly typed identifier for follow-up notes
    /// (`NotasSeguimiento.id_nota`).
    NoteId
);

define_id!(
    /// Strongly typed identifier for vision phases (`FasesVision.id_fase`).
    PhaseId
);

#[cfg(test)]
mod tests {
    use super::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_from_i64_preserves_value() {
            let id = UserId::from_i64(42);
            assert_eq!(id.as_i64(), 42);
        }

        #[test]
        fn test_display_returns_decimal_string() {
            let id = GroupId::from_i64(7);
            assert_eq!(id.to_string(), "7");
        }

        #[test]
        fn test_from_impl() {
            let id: MemberId = 99_i64.into();
            assert_eq!(id.as_i64(), 99);
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_user_id_serde_roundtrip() {
            let original = UserId::from_i64(123);
            let json = serde_json::to_string(&original).unwrap();
            let deserialized: UserId = serde_json::from_str(&json).unwrap();
            assert_eq!(original, deserialized);
        }

        #[test]
        fn test_serializes_as_plain_number() {
            let id = GroupId::from_i64(7);
            let json = serde_json::to_string(&id).unwrap();
            // Transparent newtype: plain number, not an object
            assert_eq!(json, "7");
        }
    }

    mod from_str_tests {
        use super::*;

        #[test]
        fn test_parse_valid_id() {
            let id: UserId = "42".parse().unwrap();
            assert_eq!(id.as_i64(), 42);
        }

        #[test]
        fn test_parse_invalid_id_returns_error() {
            let result: std::result::Result<GroupId, _> = "not-a-number".parse();
            assert!(result.is_err());
            let err = result.unwrap_err();
            assert_eq!(err.id_type, "GroupId");
            assert!(!err.message.is_empty());
        }

        #[test]
        fn test_error_display() {
            let result: std::result::Result<MemberId, _> = "abc".parse();
            let err = result.unwrap_err();
            let display = err.to_string();
            assert!(display.contains("MemberId"));
            assert!(display.contains("Failed to parse"));
        }
    }

    mod hash_eq_tests {
        use super::*;
        use std::collections::HashMap;

        #[test]
        fn test_same_key_is_equal() {
            assert_eq!(UserId::from_i64(5), UserId::from_i64(5));
            assert_ne!(UserId::from_i64(5), UserId::from_i64(6));
        }

        #[test]
        fn test_can_use_as_hashmap_key() {
            let mut map: HashMap<GroupId, &str> = HashMap::new();
            map.insert(GroupId::from_i64(1), "first");
            map.insert(GroupId::from_i64(2), "second");

            assert_eq!(map.get(&GroupId::from_i64(1)), Some(&"first"));
            assert_eq!(map.get(&GroupId::from_i64(2)), Some(&"second"));
        }

        #[test]
        fn test_copy_semantics() {
            let id1 = ReportId::from_i64(10);
            let id2 = id1; // Copy
            assert_eq!(id1, id2);
        }
    }
}
