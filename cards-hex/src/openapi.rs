//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use std::collections::BTreeMap;

use cards_types::domain::{CardId, ExternalId, HolderId};
use cards_types::dto::{
    CardQueryParams, CardResponse, CreateCardRequest, CreateHolderRequest, HolderQueryParams,
    HolderResponse, UpdateCardRequest, UpdateHolderRequest,
};
use utoipa::{OpenApi, ToSchema};

/// Error body returned by every failing endpoint.
#[derive(serde::Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Card with id 7 not found")]
    pub error: String,
    #[schema(example = 404)]
    pub code: u16,
    /// Per-field messages, present on validation failures only
    pub errors: Option<BTreeMap<String, String>>,
}

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List cards
#[utoipa::path(
    get,
    path = "/api/v1/cards",
    tag = "cards",
    params(CardQueryParams),
    responses(
        (status = 200, description = "Matching cards, possibly empty", body = Vec<CardResponse>)
    )
)]
async fn list_cards() {}

/// Get card by ID
#[utoipa::path(
    get,
    path = "/api/v1/cards/{id}",
    tag = "cards",
    params(
        ("id" = CardId, Path, description = "Card ID")
    ),
    responses(
        (status = 200, description = "Card details", body = CardResponse),
        (status = 400, description = "Malformed ID", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody)
    )
)]
async fn get_card() {}

/// Get card by external ID
#[utoipa::path(
    get,
    path = "/api/v1/cards/external/{external_id}",
    tag = "cards",
    params(
        ("external_id" = ExternalId, Path, description = "External card ID (UUID)")
    ),
    responses(
        (status = 200, description = "Card details", body = CardResponse),
        (status = 400, description = "Not a UUID", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody)
    )
)]
async fn get_card_by_external_id() {}

/// Create a card
#[utoipa::path(
    post,
    path = "/api/v1/cards",
    tag = "cards",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Card created", body = CardResponse),
        (status = 400, description = "Validation failed", body = ErrorBody)
    )
)]
async fn create_card() {}

/// Replace a card
///
/// Same semantics as PATCH; the holder of a card cannot be changed.
#[utoipa::path(
    put,
    path = "/api/v1/cards/{id}",
    tag = "cards",
    request_body = UpdateCardRequest,
    params(
        ("id" = CardId, Path, description = "Card ID")
    ),
    responses(
        (status = 200, description = "Card updated", body = CardResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody)
    )
)]
async fn replace_card() {}

/// Partially update a card
#[utoipa::path(
    patch,
    path = "/api/v1/cards/{id}",
    tag = "cards",
    request_body = UpdateCardRequest,
    params(
        ("id" = CardId, Path, description = "Card ID")
    ),
    responses(
        (status = 200, description = "Card updated", body = CardResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Card not found", body = ErrorBody)
    )
)]
async fn patch_card() {}

/// Delete a card
#[utoipa::path(
    delete,
    path = "/api/v1/cards/{id}",
    tag = "cards",
    params(
        ("id" = CardId, Path, description = "Card ID")
    ),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 404, description = "Card not found", body = ErrorBody)
    )
)]
async fn delete_card() {}

/// List holders
#[utoipa::path(
    get,
    path = "/api/v1/holders",
    tag = "holders",
    params(HolderQueryParams),
    responses(
        (status = 200, description = "Matching holders, possibly empty", body = Vec<HolderResponse>)
    )
)]
async fn list_holders() {}

/// Get holder by ID
#[utoipa::path(
    get,
    path = "/api/v1/holders/{id}",
    tag = "holders",
    params(
        ("id" = HolderId, Path, description = "Holder ID")
    ),
    responses(
        (status = 200, description = "Holder details", body = HolderResponse),
        (status = 404, description = "Holder not found", body = ErrorBody)
    )
)]
async fn get_holder() {}

/// Get holder by exact name (case-insensitive)
#[utoipa::path(
    get,
    path = "/api/v1/holders/by-name/{name}",
    tag = "holders",
    params(
        ("name" = String, Path, description = "Holder name")
    ),
    responses(
        (status = 200, description = "Holder details", body = HolderResponse),
        (status = 404, description = "Holder not found", body = ErrorBody)
    )
)]
async fn get_holder_by_name() {}

/// Create a holder
#[utoipa::path(
    post,
    path = "/api/v1/holders",
    tag = "holders",
    request_body = CreateHolderRequest,
    responses(
        (status = 201, description = "Holder created", body = HolderResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody)
    )
)]
async fn create_holder() {}

/// Update a holder
#[utoipa::path(
    put,
    path = "/api/v1/holders/{id}",
    tag = "holders",
    request_body = UpdateHolderRequest,
    params(
        ("id" = HolderId, Path, description = "Holder ID")
    ),
    responses(
        (status = 200, description = "Holder updated", body = HolderResponse),
        (status = 404, description = "Holder not found", body = ErrorBody),
        (status = 409, description = "Name taken, or holder still has cards", body = ErrorBody)
    )
)]
async fn update_holder() {}

/// Delete a holder
#[utoipa::path(
    delete,
    path = "/api/v1/holders/{id}",
    tag = "holders",
    params(
        ("id" = HolderId, Path, description = "Holder ID")
    ),
    responses(
        (status = 204, description = "Holder deleted"),
        (status = 404, description = "Holder not found", body = ErrorBody),
        (status = 409, description = "Holder still has cards", body = ErrorBody)
    )
)]
async fn delete_holder() {}

/// OpenAPI documentation for the Cards API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cards Service API",
        version = "1.0.0",
        description = "Payment cards and their holders.\n\nA holder that still has cards can be neither deleted nor renamed, and the holder of a card is fixed when the card is created.",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_cards,
        get_card,
        get_card_by_external_id,
        create_card,
        replace_card,
        patch_card,
        delete_card,
        list_holders,
        get_holder,
        get_holder_by_name,
        create_holder,
        update_holder,
        delete_holder,
    ),
    components(
        schemas(
            CreateCardRequest,
            UpdateCardRequest,
            CardResponse,
            CreateHolderRequest,
            UpdateHolderRequest,
            HolderResponse,
            CardId,
            HolderId,
            ExternalId,
            ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "cards", description = "Card lookup and management"),
        (name = "holders", description = "Holder lookup and management"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        assert!(paths.contains(&"/api/v1/cards/{id}"));
        assert!(paths.contains(&"/api/v1/cards/external/{external_id}"));
        assert!(paths.contains(&"/api/v1/holders/by-name/{name}"));
        assert_eq!(paths.len(), 7);
    }
}
