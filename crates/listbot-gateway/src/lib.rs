// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP gateway for listbot.
//!
//! Receives Telegram updates on the configured webhook path, checks the
//! secret token, decodes them into input events and queues them for the
//! turn loop. A public `/health` endpoint reports adapter health.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::WebhookAuth;
pub use server::{GatewayState, HealthState, router, start_server};
