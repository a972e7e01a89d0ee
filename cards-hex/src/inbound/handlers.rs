//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, Path, Query, Request, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use cards_types::{
    AppError, CardId, CardQueryParams, CreateCardRequest, CreateHolderRequest, DomainError,
    FieldErrors, HolderId, HolderQueryParams, Repository, UpdateCardRequest, UpdateHolderRequest,
};

use crate::mapper;
use crate::{CardService, HolderService};

/// Application state shared across handlers.
pub struct AppState<R: Repository> {
    pub cards: CardService<R>,
    pub holders: HolderService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self.0 {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors),
            ),
            AppError::MalformedIdentifier(raw) => (
                StatusCode::BAD_REQUEST,
                format!("Malformed identifier: {}", raw),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = match errors {
            Some(errors) => serde_json::json!({
                "error": message,
                "code": status.as_u16(),
                "errors": errors,
            }),
            None => serde_json::json!({
                "error": message,
                "code": status.as_u16()
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body extractor that reports unreadable bodies in the API error format.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let mut errors = FieldErrors::new();
                errors.add("body", rejection.body_text());
                Err(ApiError(AppError::Validation(errors)))
            }
        }
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Cards
// ─────────────────────────────────────────────────────────────────────────────

/// List cards, optionally filtered by number and holder.
#[tracing::instrument(skip(state))]
pub async fn list_cards<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<CardQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let cards = state
        .cards
        .find_all(params.number.as_deref(), params.holder.as_deref())
        .await?;
    Ok(Json(
        cards.into_iter().map(mapper::card_response).collect::<Vec<_>>(),
    ))
}

#[tracing::instrument(skip(state), fields(card_id = %id))]
pub async fn get_card<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let card_id: CardId = id.parse()?;
    let card = state.cards.find_by_id(card_id).await?;
    Ok(Json(mapper::card_response(card)))
}

#[tracing::instrument(skip(state), fields(external_id = %external_id))]
pub async fn get_card_by_external_id<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(external_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.cards.find_by_external_id(&external_id).await?;
    Ok(Json(mapper::card_response(card)))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_card<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CreateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.cards.create(req).await?;
    Ok((StatusCode::CREATED, Json(mapper::card_response(card))))
}

/// Full replace (PUT). Shares the merge path with PATCH.
#[tracing::instrument(skip(state, req), fields(card_id = %id))]
pub async fn replace_card<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card_id: CardId = id.parse()?;
    let card = state.cards.update(card_id, req).await?;
    Ok(Json(mapper::card_response(card)))
}

#[tracing::instrument(skip(state, req), fields(card_id = %id))]
pub async fn patch_card<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card_id: CardId = id.parse()?;
    let card = state.cards.update(card_id, req).await?;
    Ok(Json(mapper::card_response(card)))
}

#[tracing::instrument(skip(state), fields(card_id = %id))]
pub async fn delete_card<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let card_id: CardId = id.parse()?;
    state.cards.delete(card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Holders
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_holders<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<HolderQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let holders = state.holders.find_all(params.name.as_deref()).await?;
    Ok(Json(
        holders
            .into_iter()
            .map(mapper::holder_response)
            .collect::<Vec<_>>(),
    ))
}

#[tracing::instrument(skip(state), fields(holder_id = %id))]
pub async fn get_holder<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let holder_id: HolderId = id.parse()?;
    let holder = state.holders.find_by_id(holder_id).await?;
    Ok(Json(mapper::holder_response(holder)))
}

/// Exact, case-insensitive lookup by name.
#[tracing::instrument(skip(state))]
pub async fn get_holder_by_name<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let holder = state.holders.find_by_name(&name).await?;
    Ok(Json(mapper::holder_response(holder)))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_holder<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CreateHolderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let holder = state.holders.create(req).await?;
    Ok((StatusCode::CREATED, Json(mapper::holder_response(holder))))
}

#[tracing::instrument(skip(state, req), fields(holder_id = %id))]
pub async fn update_holder<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateHolderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let holder_id: HolderId = id.parse()?;
    let holder = state.holders.update(holder_id, req).await?;
    Ok(Json(mapper::holder_response(holder)))
}

#[tracing::instrument(skip(state), fields(holder_id = %id))]
pub async fn delete_holder<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let holder_id: HolderId = id.parse()?;
    state.holders.delete(holder_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
