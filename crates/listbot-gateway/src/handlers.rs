// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook and health endpoints.

use std::time::Duration;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use listbot_core::{HealthStatus, ListbotError};
use serde::Serialize;
use teloxide::types::Update;
use tracing::{debug, warn};

use crate::server::GatewayState;

/// How long a delivery may wait for room in the inbound channel.
const ENQUEUE_TIMEOUT: Duration = Duration::from_secs(5);

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when every adapter is healthy, else "degraded" or "unhealthy".
    pub status: String,
    /// Binary version.
    pub version: String,
    pub uptime_secs: u64,
    pub storage: String,
    pub transport: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// POST `<webhook_path>`
///
/// Decodes a Telegram update and queues it for the turn loop. Payloads that
/// cannot be decoded, or that the bot does not react to, are acknowledged
/// with 200 so Telegram does not redeliver them.
pub async fn post_update(State(state): State<GatewayState>, body: Bytes) -> Response {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "discarding undecodable webhook payload");
            return StatusCode::OK.into_response();
        }
    };

    let Some(event) = listbot_telegram::decode_update(&update) else {
        debug!(update_id = ?update.id, "ignoring unsupported update");
        return StatusCode::OK.into_response();
    };

    match tokio::time::timeout(ENQUEUE_TIMEOUT, state.inbound_tx.send(event)).await {
        Ok(Ok(())) => StatusCode::OK.into_response(),
        Ok(Err(_)) => unavailable("turn loop not accepting updates"),
        Err(_) => unavailable("inbound channel full"),
    }
}

fn unavailable(error: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// GET /health
///
/// Reports storage and transport health. Answers 503 when any adapter is
/// unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let storage = state.health.store.health_check().await;
    let transport = state.health.transport.health_check().await;

    let statuses = [status_of(&storage), status_of(&transport)];
    let (code, status) = if statuses.iter().any(|s| matches!(s, HealthStatus::Unhealthy(_))) {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    } else if statuses.iter().any(|s| matches!(s, HealthStatus::Degraded(_))) {
        (StatusCode::OK, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        storage: describe(&statuses[0]),
        transport: describe(&statuses[1]),
    };
    (code, Json(response)).into_response()
}

fn status_of(result: &Result<HealthStatus, ListbotError>) -> HealthStatus {
    match result {
        Ok(status) => status.clone(),
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    }
}

fn describe(status: &HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Degraded(reason) => format!("degraded: {reason}"),
        HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
    }
}
