// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity, input event, and adapter types shared across the workspace.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a chat (private conversation or group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Identifier of a message within a chat, used for threaded replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef(pub i32);

/// Opaque reference to a photo held by the transport (e.g. a Telegram file id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageRef(pub String);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The (chat, user) pair identifying one logical multi-step session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub chat: ChatId,
    pub user: UserId,
}

impl ConversationKey {
    pub fn new(chat: ChatId, user: UserId) -> Self {
        Self { chat, user }
    }

    /// A private conversation has the same identity as its only participant.
    pub fn is_private(&self) -> bool {
        self.chat.0 == self.user.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat, self.user)
    }
}

/// One inbound event, already decoded from the transport payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Free text, including slash commands and reply-keyboard presses.
    Text {
        chat: ChatId,
        user: UserId,
        text: String,
        message: MessageRef,
    },
    /// A photo message.
    Photo {
        chat: ChatId,
        user: UserId,
        image: ImageRef,
        message: MessageRef,
    },
    /// A one-shot inline option was selected.
    ButtonSelection {
        chat: ChatId,
        user: UserId,
        payload: String,
        /// Transport handle used to acknowledge the selection, if any.
        selection_id: Option<String>,
    },
}

impl InputEvent {
    pub fn key(&self) -> ConversationKey {
        match self {
            InputEvent::Text { chat, user, .. }
            | InputEvent::Photo { chat, user, .. }
            | InputEvent::ButtonSelection { chat, user, .. } => ConversationKey::new(*chat, *user),
        }
    }

    /// The inbound message a reply can be threaded to. Button selections have none.
    pub fn message(&self) -> Option<MessageRef> {
        match self {
            InputEvent::Text { message, .. } | InputEvent::Photo { message, .. } => Some(*message),
            InputEvent::ButtonSelection { .. } => None,
        }
    }

    /// Short channel name for logs.
    pub fn channel(&self) -> &'static str {
        match self {
            InputEvent::Text { .. } => "text",
            InputEvent::Photo { .. } => "photo",
            InputEvent::ButtonSelection { .. } => "button",
        }
    }
}

/// A selectable one-shot option: what the user sees and what comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineOption {
    pub label: String,
    pub payload: String,
}

impl InlineOption {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }

    /// An option whose payload equals its label.
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            payload: text,
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Storage,
}
