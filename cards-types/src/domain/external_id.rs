//! Stable external identifier.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;

/// Globally unique identifier assigned once when a record is created.
///
/// Unlike the surrogate id it does not depend on the store, so it is the
/// identifier handed out to external systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ExternalId(Uuid);

impl ExternalId {
    /// Creates a new random ExternalId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an ExternalId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for ExternalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for ExternalId {
    type Err = DomainError;

    /// Only the canonical hyphenated form is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != uuid::fmt::Hyphenated::LENGTH {
            return Err(DomainError::MalformedIdentifier(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::MalformedIdentifier(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_text() {
        let id = ExternalId::new();
        let parsed: ExternalId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_rejects_garbage() {
        let result = "not-a-uuid".parse::<ExternalId>();
        assert!(matches!(result, Err(DomainError::MalformedIdentifier(s)) if s == "not-a-uuid"));
    }

    #[test]
    fn test_rejects_non_canonical_forms() {
        let simple = "67e5504410b1426f9247bb680e5fe0c8";
        assert!(simple.parse::<ExternalId>().is_err());

        let braced = "{67e55044-10b1-426f-9247-bb680e5fe0c8}";
        assert!(braced.parse::<ExternalId>().is_err());
    }

    #[test]
    fn test_accepts_uppercase_hex() {
        let id: ExternalId = "67E55044-10B1-426F-9247-BB680E5FE0C8".parse().unwrap();
        assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }
}
