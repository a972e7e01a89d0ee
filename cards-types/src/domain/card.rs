//! Card domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::external_id::ExternalId;
use crate::error::DomainError;

/// Surrogate identifier for a Card, assigned by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct CardId(i64);

impl CardId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CardId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| DomainError::MalformedIdentifier(s.to_string()))
    }
}

/// A payment card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub external_id: ExternalId,
    /// Card number as supplied (bare, space or hyphen grouped)
    pub number: String,
    pub cvc: String,
    pub expiry: NaiveDate,
    /// Name of the owning holder. Fixed at creation.
    pub holder_name: String,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A card that has not been persisted yet.
///
/// Carries everything except the surrogate id, which only the store knows.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub external_id: ExternalId,
    pub number: String,
    pub cvc: String,
    pub expiry: NaiveDate,
    pub holder_name: String,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewCard {
    /// Attaches the id assigned by the store.
    pub fn with_id(self, id: CardId) -> Card {
        Card {
            id,
            external_id: self.external_id,
            number: self.number,
            cvc: self.cvc,
            expiry: self.expiry,
            holder_name: self.holder_name,
            balance: self.balance,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_parse() {
        let id: CardId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn test_card_id_parse_rejects_text() {
        let result = "abc".parse::<CardId>();
        assert!(matches!(result, Err(DomainError::MalformedIdentifier(_))));
    }

    #[test]
    fn test_with_id_keeps_fields() {
        let now = Utc::now();
        let draft = NewCard {
            external_id: ExternalId::new(),
            number: "1111-2222-3333-4444".to_string(),
            cvc: "123".to_string(),
            expiry: NaiveDate::from_ymd_opt(2099, 1, 31).unwrap(),
            holder_name: "Ana".to_string(),
            balance: 10.0,
            created_at: now,
            updated_at: now,
        };

        let card = draft.clone().with_id(CardId::new(7));

        assert_eq!(card.id, CardId::new(7));
        assert_eq!(card.external_id, draft.external_id);
        assert_eq!(card.holder_name, "Ana");
        assert_eq!(card.created_at, now);
    }
}
