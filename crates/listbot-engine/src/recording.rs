// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is
//! a no-op.

use metrics::{describe_counter, describe_histogram};

use crate::engine::TurnOutcome;

/// Register all engine metric descriptions.
pub fn register_metrics() {
    describe_counter!("listbot_turns_total", "Turns handled, by outcome");
    describe_counter!(
        "listbot_delivery_failures_total",
        "Outbound effects the transport failed to deliver"
    );
    describe_counter!("listbot_items_committed_total", "Items upserted or deleted");
    describe_histogram!("listbot_turn_duration_seconds", "Wall time of one turn");
}

/// Record a finished turn.
pub fn record_turn(outcome: TurnOutcome, seconds: f64) {
    metrics::counter!("listbot_turns_total", "outcome" => outcome.to_string()).increment(1);
    metrics::histogram!("listbot_turn_duration_seconds").record(seconds);
}

/// Record an effect the transport rejected.
pub fn record_delivery_failure() {
    metrics::counter!("listbot_delivery_failures_total").increment(1);
}

/// Record an item mutation (`upsert` or `delete`).
pub fn record_item_commit(kind: &'static str) {
    metrics::counter!("listbot_items_committed_total", "kind" => kind).increment(1);
}
