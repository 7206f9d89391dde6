//! Strongly Typed Identifiers
//!
//! Newtype wrappers around UUIDs so that an incident id can never be passed
//! where an account id is expected.
//!
//! # Example
//!
//! ```
//! use noc_core::{IncidentId, UserId};
//!
//! let user = UserId::new();
//! let incident = IncidentId::new();
//!
//! fn requires_user(id: UserId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_user(user);
//! // requires_user(incident); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
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
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
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
    /// Identifier of an operator account.
    ///
    /// Used for incident creators, assignees and communication authors.
    ///
    /// # Example
    ///
    /// ```
    /// use noc_core::UserId;
    /// use uuid::Uuid;
    ///
    /// let uuid = Uuid::new_v4();
    /// let user_id = UserId::from_uuid(uuid);
    /// assert_eq!(user_id.as_uuid(), &uuid);
    ///
    /// let parsed: UserId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
    /// ```
    UserId
);

define_id!(
    /// Identifier of an incident record (distinct from its human-readable number).
    IncidentId
);

define_id!(
    /// Identifier of a single entry in an incident's communication log.
    CommunicationId
);

define_id!(
    /// Identifier of a monitored network device.
    DeviceId
);

define_id!(
    /// Identifier of a customer.
    CustomerId
);

#[cfg(test)]
mod tests {
    use super::*;

    mod user_id_tests {
        use super::*;

        #[test]
        fn test_new_creates_valid_id() {
            let id = UserId::new();
            let id_str = id.to_string();
            // UUID format: 8-4-4-4-12 hex digits
            assert_eq!(id_str.len(), 36);
            assert!(id_str.contains('-'));
        }

        #[test]
        fn test_display_returns_uuid_string() {
            let uuid = Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap();
            let id = UserId::from_uuid(uuid);
            assert_eq!(id.to_string(), "123e4567-e89b-12d3-a456-426614174000");
        }

        #[test]
        fn test_default_creates_new_id() {
            assert_ne!(UserId::default(), UserId::default());
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_serializes_as_plain_string() {
            let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
            let id = IncidentId::from_uuid(uuid);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");

            let back: IncidentId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, id);
        }
    }

    mod from_str_tests {
        use super::*;

        #[test]
        fn test_parse_invalid_uuid_returns_error() {
            let result: std::result::Result<IncidentId, _> = "INC-202503-0001".parse();
            let err = result.unwrap_err();
            assert_eq!(err.id_type, "IncidentId");
            assert!(!err.message.is_empty());
        }

        #[test]
        fn test_parse_empty_string_returns_error() {
            let err = "".parse::<UserId>().unwrap_err();
            assert_eq!(err.id_type, "UserId");
            assert!(err.to_string().contains("Failed to parse UserId"));
        }
    }

    #[test]
    fn test_ids_are_usable_as_map_keys() {
        use std::collections::HashMap;

        let mut map: HashMap<UserId, &str> = HashMap::new();
        let a = UserId::new();
        let b = UserId::new();
        map.insert(a, "alice");
        map.insert(b, "bob");

        assert_eq!(map.get(&a), Some(&"alice"));
        assert_eq!(map.get(&b), Some(&"bob"));
    }
}
