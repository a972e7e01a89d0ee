//! # Cards Client SDK
//!
//! A typed Rust client for the Cards API.

use cards_types::{
    CardId, CardResponse, CreateCardRequest, CreateHolderRequest, HolderId, HolderResponse,
    UpdateCardRequest, UpdateHolderRequest,
};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Cards API client.
pub struct CardsClient {
    base_url: String,
    api_version: String,
    http: Client,
}

impl CardsClient {
    /// Creates a new client talking to `/api/v1` under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: "v1".to_string(),
            http: Client::new(),
        }
    }

    /// Targets a different API version segment.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cards
    // ─────────────────────────────────────────────────────────────────────────

    /// Lists cards, optionally filtered by number and holder substrings.
    pub async fn list_cards(
        &self,
        number: Option<&str>,
        holder: Option<&str>,
    ) -> Result<Vec<CardResponse>, ClientError> {
        let mut query = Vec::new();
        if let Some(number) = number {
            query.push(("number", number));
        }
        if let Some(holder) = holder {
            query.push(("holder", holder));
        }
        let req = self.request(Method::GET, &["cards"])?.query(&query);
        self.send(req).await
    }

    /// Gets a card by surrogate id.
    pub async fn get_card(&self, id: CardId) -> Result<CardResponse, ClientError> {
        let id = id.to_string();
        self.send(self.request(Method::GET, &["cards", &id])?).await
    }

    /// Gets a card by its external UUID.
    pub async fn get_card_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<CardResponse, ClientError> {
        self.send(self.request(Method::GET, &["cards", "external", external_id])?)
            .await
    }

    /// Creates a new card.
    pub async fn create_card(&self, req: &CreateCardRequest) -> Result<CardResponse, ClientError> {
        self.send(self.request(Method::POST, &["cards"])?.json(req))
            .await
    }

    /// Replaces a card (PUT).
    pub async fn replace_card(
        &self,
        id: CardId,
        req: &UpdateCardRequest,
    ) -> Result<CardResponse, ClientError> {
        let id = id.to_string();
        self.send(self.request(Method::PUT, &["cards", &id])?.json(req))
            .await
    }

    /// Partially updates a card (PATCH).
    pub async fn patch_card(
        &self,
        id: CardId,
        req: &UpdateCardRequest,
    ) -> Result<CardResponse, ClientError> {
        let id = id.to_string();
        self.send(self.request(Method::PATCH, &["cards", &id])?.json(req))
            .await
    }

    /// Deletes a card.
    pub async fn delete_card(&self, id: CardId) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send_empty(self.request(Method::DELETE, &["cards", &id])?)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Holders
    // ─────────────────────────────────────────────────────────────────────────

    /// Lists holders, optionally filtered by a name substring.
    pub async fn list_holders(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<HolderResponse>, ClientError> {
        let mut req = self.request(Method::GET, &["holders"])?;
        if let Some(name) = name {
            req = req.query(&[("name", name)]);
        }
        self.send(req).await
    }

    pub async fn get_holder(&self, id: HolderId) -> Result<HolderResponse, ClientError> {
        let id = id.to_string();
        self.send(self.request(Method::GET, &["holders", &id])?).await
    }

    /// Gets a holder by exact, case-insensitive name.
    pub async fn get_holder_by_name(&self, name: &str) -> Result<HolderResponse, ClientError> {
        self.send(self.request(Method::GET, &["holders", "by-name", name])?)
            .await
    }

    pub async fn create_holder(&self, name: &str) -> Result<HolderResponse, ClientError> {
        let req = CreateHolderRequest {
            name: name.to_string(),
        };
        self.send(self.request(Method::POST, &["holders"])?.json(&req))
            .await
    }

    pub async fn update_holder(
        &self,
        id: HolderId,
        name: Option<String>,
    ) -> Result<HolderResponse, ClientError> {
        let id = id.to_string();
        let req = UpdateHolderRequest { name };
        self.send(self.request(Method::PUT, &["holders", &id])?.json(&req))
            .await
    }

    pub async fn delete_holder(&self, id: HolderId) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send_empty(self.request(Method::DELETE, &["holders", &id])?)
            .await
    }

    /// Builds `{base}/api/{version}/{segments..}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", self.api_version.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = self.check(req.send().await?).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        self.check(req.send().await?).await?;
        Ok(())
    }

    async fn check(&self, resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or(body);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CardsClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
        assert_eq!(client.api_version, "v1");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = CardsClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_endpoint_uses_api_version() {
        let client = CardsClient::new("http://localhost:3000").with_api_version("v2");
        let url = client.endpoint(&["cards", "7"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/v2/cards/7");
    }

    #[test]
    fn test_endpoint_encodes_names() {
        let client = CardsClient::new("http://localhost:3000");
        let url = client.endpoint(&["holders", "by-name", "Ana Maria"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/v1/holders/by-name/Ana%20Maria"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = CardsClient::new("not a url");
        assert!(matches!(
            client.endpoint(&["cards"]),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
