//! pamsync connector composition root.

#![forbid(unsafe_code)]

mod connector_config;
mod dto;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use pamsync_application::ConnectorService;
use pamsync_core::AppError;
use pamsync_infrastructure::HttpPamGateway;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::connector_config::{ConnectorConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConnectorConfig::load()?;
    let address = config.socket_address()?;

    info!(
        tenant_url = %config.pam.tenant_url,
        safe_roles = config.catalog.roles().len(),
        safe_rights = config.catalog.rights().len(),
        token_cache = ?config.pam.token_cache,
        "loaded connector configuration"
    );

    let gateway = Arc::new(HttpPamGateway::new(&config.pam)?);
    let connector_service = ConnectorService::new(gateway, Arc::new(config.catalog));

    let app = build_router(AppState { connector_service });

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "pamsync-connector listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("connector server error: {error}")))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/commands", post(handlers::command_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
