// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook authentication.
//!
//! Telegram echoes the secret registered with `setWebhook` in the
//! `X-Telegram-Bot-Api-Secret-Token` header. When a secret is configured,
//! requests without a matching header are rejected.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Header Telegram uses to echo the webhook secret.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Authentication configuration for the webhook route.
#[derive(Clone, Default)]
pub struct WebhookAuth {
    /// Expected secret token. `None` disables the check.
    pub secret: Option<String>,
}

impl std::fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookAuth")
            .field("secret", &self.secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl WebhookAuth {
    /// Returns `true` when `presented` satisfies the configured secret.
    pub fn accepts(&self, presented: Option<&str>) -> bool {
        match self.secret.as_deref() {
            None => true,
            Some(expected) => presented == Some(expected),
        }
    }
}

/// Middleware that validates the webhook secret header.
pub async fn secret_middleware(
    State(auth): State<WebhookAuth>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    if auth.accepts(presented) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        header_present = presented.is_some(),
        "webhook request rejected: secret token mismatch"
    );
    Err(StatusCode::UNAUTHORIZED)
}
