// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use listbot_config::model::GatewayConfig;
use listbot_core::{ConversationStore, InputEvent, ListbotError, Transport};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use crate::auth::{WebhookAuth, secret_middleware};
use crate::handlers;

/// Adapters probed by the health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    pub store: Arc<dyn ConversationStore>,
    pub transport: Arc<dyn Transport>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Channel feeding decoded updates to the turn loop.
    pub inbound_tx: mpsc::Sender<InputEvent>,
    /// Webhook secret check.
    pub auth: WebhookAuth,
    /// Health state for the unauthenticated endpoint.
    pub health: HealthState,
}

/// Builds the gateway router:
/// - POST `<webhook_path>` (secret token checked)
/// - GET /health (unauthenticated)
pub fn router(config: &GatewayConfig, state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let webhook_routes = Router::new()
        .route(&config.webhook_path, post(handlers::post_update))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            secret_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server and serve until `shutdown` resolves.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ListbotError> {
    let app = router(config, state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ListbotError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!(webhook_path = %config.webhook_path, "Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ListbotError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
