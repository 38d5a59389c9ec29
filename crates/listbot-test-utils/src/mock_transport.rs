// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `Transport` by recording every call as a
//! [`Delivery`] for assertion in tests. It can be switched into a failing
//! mode to exercise delivery-error handling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use listbot_core::{
    AdapterType, ChatId, HealthStatus, ImageRef, InlineOption, ListbotError, MessageRef,
    PluginAdapter, Transport,
};

/// One captured transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Text {
        chat: ChatId,
        text: String,
    },
    Photo {
        chat: ChatId,
        image: ImageRef,
    },
    ButtonMenu {
        chat: ChatId,
        text: String,
        rows: Vec<Vec<String>>,
        reply_to: Option<MessageRef>,
    },
    InlineOptions {
        chat: ChatId,
        text: String,
        rows: Vec<Vec<InlineOption>>,
    },
    ClearMenu {
        chat: ChatId,
        text: String,
        reply_to: Option<MessageRef>,
    },
    PrivateRedirect {
        chat: ChatId,
        text: String,
        label: String,
        start_param: String,
    },
    Acknowledged(String),
}

impl Delivery {
    /// The message text, for deliveries that carry one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Delivery::Text { text, .. }
            | Delivery::ButtonMenu { text, .. }
            | Delivery::InlineOptions { text, .. }
            | Delivery::ClearMenu { text, .. }
            | Delivery::PrivateRedirect { text, .. } => Some(text),
            Delivery::Photo { .. } | Delivery::Acknowledged(_) => None,
        }
    }

    /// Payloads of the inline options, flattened row by row.
    pub fn option_payloads(&self) -> Vec<&str> {
        match self {
            Delivery::InlineOptions { rows, .. } => rows
                .iter()
                .flatten()
                .map(|option| option.payload.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A transport that records instead of sending.
#[derive(Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<Delivery>>>,
    failing: AtomicBool,
    acknowledge_delay_ms: AtomicU64,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, every call fails and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes every `acknowledge` call take `delay`, like a slow Bot API round trip.
    pub fn set_acknowledge_delay(&self, delay: Duration) {
        self.acknowledge_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Everything delivered so far, in order.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.sent.lock().await.clone()
    }

    /// Texts of all deliveries that carry one, in order.
    pub async fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|d| d.text().map(str::to_string))
            .collect()
    }

    /// The most recent delivery, if any.
    pub async fn last(&self) -> Option<Delivery> {
        self.sent.lock().await.last().cloned()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }

    async fn record(&self, delivery: Delivery) -> Result<(), ListbotError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ListbotError::Transport {
                message: "mock transport is failing".into(),
                source: None,
            });
        }
        self.sent.lock().await.push(delivery);
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, ListbotError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Degraded("failing on purpose".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), ListbotError> {
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), ListbotError> {
        self.record(Delivery::Text {
            chat,
            text: text.to_string(),
        })
        .await
    }

    async fn send_photo(&self, chat: ChatId, image: &ImageRef) -> Result<(), ListbotError> {
        self.record(Delivery::Photo {
            chat,
            image: image.clone(),
        })
        .await
    }

    async fn show_button_menu(
        &self,
        chat: ChatId,
        text: &str,
        rows: &[Vec<String>],
        reply_to: Option<MessageRef>,
    ) -> Result<(), ListbotError> {
        self.record(Delivery::ButtonMenu {
            chat,
            text: text.to_string(),
            rows: rows.to_vec(),
            reply_to,
        })
        .await
    }

    async fn show_inline_options(
        &self,
        chat: ChatId,
        text: &str,
        rows: &[Vec<InlineOption>],
    ) -> Result<(), ListbotError> {
        self.record(Delivery::InlineOptions {
            chat,
            text: text.to_string(),
            rows: rows.to_vec(),
        })
        .await
    }

    async fn clear_menu(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageRef>,
    ) -> Result<(), ListbotError> {
        self.record(Delivery::ClearMenu {
            chat,
            text: text.to_string(),
            reply_to,
        })
        .await
    }

    async fn send_private_redirect(
        &self,
        chat: ChatId,
        text: &str,
        label: &str,
        start_param: &str,
    ) -> Result<(), ListbotError> {
        self.record(Delivery::PrivateRedirect {
            chat,
            text: text.to_string(),
            label: label.to_string(),
            start_param: start_param.to_string(),
        })
        .await
    }

    async fn acknowledge(&self, selection_id: &str) -> Result<(), ListbotError> {
        let delay = self.acknowledge_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.record(Delivery::Acknowledged(selection_id.to_string()))
            .await
    }
}
