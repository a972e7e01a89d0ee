//! Holder domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// Surrogate identifier for a Holder, assigned by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct HolderId(i64);

impl HolderId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for HolderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| DomainError::MalformedIdentifier(s.to_string()))
    }
}

/// The owner of zero or more cards.
///
/// Cards point at their holder by name; the set of owned cards is derived
/// by query and never stored on the holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    pub id: HolderId,
    /// Unique across holders, compared case-insensitively
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Holder {
    /// Returns true if `name` refers to this holder.
    pub fn is_named(&self, name: &str) -> bool {
        crate::ports::fold_case(&self.name) == crate::ports::fold_case(name)
    }
}

/// A holder that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHolder {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewHolder {
    /// Attaches the id assigned by the store.
    pub fn with_id(self, id: HolderId) -> Holder {
        Holder {
            id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
