//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cards_types::Repository;

use super::handlers::{self, AppState};
use crate::openapi::ApiDoc;
use crate::{CardService, HolderService};

/// Path segment used when no API version is configured.
pub const DEFAULT_API_VERSION: &str = "v1";

/// HTTP Server for the Cards API.
pub struct HttpServer<R: Repository> {
    state: Arc<AppState<R>>,
    api_version: String,
}

impl<R: Repository> HttpServer<R> {
    /// Creates a new HTTP server with the given services.
    pub fn new(cards: CardService<R>, holders: HolderService<R>) -> Self {
        Self {
            state: Arc::new(AppState { cards, holders }),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Serves the REST routes under `/api/{version}` instead of `/api/v1`.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let api = Router::new()
            .route(
                "/cards",
                get(handlers::list_cards::<R>).post(handlers::create_card::<R>),
            )
            .route(
                "/cards/{id}",
                get(handlers::get_card::<R>)
                    .put(handlers::replace_card::<R>)
                    .patch(handlers::patch_card::<R>)
                    .delete(handlers::delete_card::<R>),
            )
            .route(
                "/cards/external/{external_id}",
                get(handlers::get_card_by_external_id::<R>),
            )
            .route(
                "/holders",
                get(handlers::list_holders::<R>).post(handlers::create_holder::<R>),
            )
            .route(
                "/holders/{id}",
                get(handlers::get_holder::<R>)
                    .put(handlers::update_holder::<R>)
                    .delete(handlers::delete_holder::<R>),
            )
            .route(
                "/holders/by-name/{name}",
                get(handlers::get_holder_by_name::<R>),
            );

        Router::new()
            .route("/health", get(handlers::health))
            .nest(&format!("/api/{}", self.api_version), api)
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            "Server listening on {} (api {})",
            listener.local_addr()?,
            self.api_version
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
