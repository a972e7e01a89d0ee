//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Request types carry their own validation rules; the services call
//! [`validator::Validate::validate`] before anything reaches the store.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::{CardId, ExternalId, HolderId};

/// 16 bare digits, or 4x4 digits grouped by single spaces or single hyphens.
static CARD_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]{16}|[0-9]{4}(?: [0-9]{4}){3}|[0-9]{4}(?:-[0-9]{4}){3})$")
        .expect("card number pattern is valid")
});

static CVC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}$").expect("cvc pattern is valid"));

pub const CARD_NUMBER_MESSAGE: &str =
    "card number must be 16 digits, optionally grouped 4-4-4-4 by spaces or hyphens";
pub const CVC_MESSAGE: &str = "CVC must be exactly 3 digits";
pub const EXPIRY_MESSAGE: &str = "expiry date must be in the future";
pub const HOLDER_NAME_MESSAGE: &str = "holder name cannot be blank";
pub const NAME_LENGTH_MESSAGE: &str = "name must be at least 3 characters long";

/// Returns true if `number` has one of the accepted card number layouts.
pub fn is_card_number(number: &str) -> bool {
    CARD_NUMBER_RE.is_match(number)
}

fn validate_card_number(number: &str) -> Result<(), ValidationError> {
    if is_card_number(number) {
        Ok(())
    } else {
        Err(ValidationError::new("regex").with_message(Cow::Borrowed(CARD_NUMBER_MESSAGE)))
    }
}

fn validate_cvc(cvc: &str) -> Result<(), ValidationError> {
    if CVC_RE.is_match(cvc) {
        Ok(())
    } else {
        Err(ValidationError::new("regex").with_message(Cow::Borrowed(CVC_MESSAGE)))
    }
}

fn validate_name_length(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() >= 3 {
        Ok(())
    } else {
        Err(ValidationError::new("length").with_message(Cow::Borrowed(NAME_LENGTH_MESSAGE)))
    }
}

fn validate_future_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Utc::now().date_naive() {
        Ok(())
    } else {
        Err(ValidationError::new("future").with_message(Cow::Borrowed(EXPIRY_MESSAGE)))
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message(Cow::Borrowed(HOLDER_NAME_MESSAGE)))
    } else {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Card DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new card.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCardRequest {
    #[schema(example = "1111-2222-3333-4444")]
    #[validate(custom(function = "validate_card_number"))]
    pub number: String,
    #[schema(example = "123")]
    #[validate(custom(function = "validate_cvc"))]
    pub cvc: String,
    #[validate(custom(function = "validate_future_date"))]
    pub expiry: NaiveDate,
    /// Name of the owning holder; cannot be changed later
    #[schema(example = "Ana")]
    #[validate(custom(function = "validate_not_blank"))]
    pub holder_name: String,
    #[schema(example = 123.0)]
    pub balance: f64,
}

/// Request to update a card, used for both full replace and partial patch.
///
/// Omitted fields are left unchanged. There is deliberately no
/// `holder_name`: unknown fields are rejected, so the holder of a card
/// cannot be sent at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCardRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_card_number"))]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_cvc"))]
    pub cvc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_future_date"))]
    pub expiry: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

/// Card as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CardResponse {
    pub id: CardId,
    pub external_id: ExternalId,
    #[schema(example = "1111-2222-3333-4444")]
    pub number: String,
    #[schema(example = "123")]
    pub cvc: String,
    pub expiry: NaiveDate,
    #[schema(example = "Ana")]
    pub holder_name: String,
    #[schema(example = 123.0)]
    pub balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional filters for listing cards. Empty strings count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CardQueryParams {
    /// Case-insensitive substring of the card number
    pub number: Option<String>,
    /// Case-insensitive substring of the holder name
    pub holder: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Holder DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new holder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateHolderRequest {
    #[schema(example = "Ana")]
    #[validate(custom(function = "validate_name_length"))]
    pub name: String,
}

/// Request to update a holder. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateHolderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_name_length"))]
    pub name: Option<String>,
}

/// Holder as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HolderResponse {
    pub id: HolderId,
    #[schema(example = "Ana")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional filter for listing holders. An empty string counts as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HolderQueryParams {
    /// Case-insensitive substring of the holder name
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrors;
    use chrono::Duration;

    fn tomorrow() -> NaiveDate {
        Utc::now().date_naive() + Duration::days(1)
    }

    fn valid_create() -> CreateCardRequest {
        CreateCardRequest {
            number: "1111-2222-3333-4444".to_string(),
            cvc: "123".to_string(),
            expiry: tomorrow(),
            holder_name: "Ana".to_string(),
            balance: 123.0,
        }
    }

    fn field_errors(req: &impl Validate) -> FieldErrors {
        req.validate().map_err(FieldErrors::from).unwrap_err()
    }

    #[test]
    fn test_accepted_number_layouts() {
        assert!(is_card_number("1111222233334444"));
        assert!(is_card_number("1111 2222 3333 4444"));
        assert!(is_card_number("1111-2222-3333-4444"));
    }

    #[test]
    fn test_rejected_number_layouts() {
        assert!(!is_card_number("1111"));
        assert!(!is_card_number("1111-2222 3333-4444"));
        assert!(!is_card_number("1111  2222 3333 4444"));
        assert!(!is_card_number("11112222333344445"));
        assert!(!is_card_number("1111-2222-3333-444a"));
        assert!(!is_card_number("١١١١٢٢٢٢٣٣٣٣٤٤٤٤"));
    }

    #[test]
    fn test_valid_create_request_passes() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn test_short_number_is_rejected() {
        let req = CreateCardRequest {
            number: "1111".to_string(),
            ..valid_create()
        };
        let errors = field_errors(&req);
        assert_eq!(errors.get("number"), Some(CARD_NUMBER_MESSAGE));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_every_broken_field_is_reported() {
        let req = CreateCardRequest {
            number: "abc".to_string(),
            cvc: "12".to_string(),
            expiry: Utc::now().date_naive(),
            holder_name: "  ".to_string(),
            balance: 0.0,
        };
        let errors = field_errors(&req);
        assert_eq!(errors.get("cvc"), Some(CVC_MESSAGE));
        assert_eq!(errors.get("expiry"), Some(EXPIRY_MESSAGE));
        assert_eq!(errors.get("holder_name"), Some(HOLDER_NAME_MESSAGE));
        assert_eq!(errors.get("number"), Some(CARD_NUMBER_MESSAGE));
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdateCardRequest::default().validate().is_ok());
    }

    #[test]
    fn test_update_checks_only_present_fields() {
        let req = UpdateCardRequest {
            cvc: Some("1234".to_string()),
            balance: Some(10.0),
            ..Default::default()
        };
        let errors = field_errors(&req);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["cvc"]);
        assert_eq!(errors.get("cvc"), Some(CVC_MESSAGE));
    }

    #[test]
    fn test_update_rejects_holder_field() {
        let json = r#"{"balance": 500.0, "holder_name": "Eve"}"#;
        let result = serde_json::from_str::<UpdateCardRequest>(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_holder_name_minimum_length() {
        let req = CreateHolderRequest {
            name: "Al".to_string(),
        };
        let errors = field_errors(&req);
        assert_eq!(errors.get("name"), Some(NAME_LENGTH_MESSAGE));

        let short = UpdateHolderRequest {
            name: Some("Al".to_string()),
        };
        assert_eq!(field_errors(&short).get("name"), Some(NAME_LENGTH_MESSAGE));

        let ok = UpdateHolderRequest {
            name: Some("Élo".to_string()),
        };
        assert!(ok.validate().is_ok());
    }
}
