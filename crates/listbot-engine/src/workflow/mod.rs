// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-category workflow handlers.
//!
//! A handler reads whatever it needs through [`Ctx`] and returns a [`Turn`]:
//! the complete write-set of the turn plus the messages to send. Handlers
//! never write to the store themselves.

pub mod add_edit;
pub mod delete;
pub mod edit;
pub mod idle;
pub mod query;

use listbot_config::EngineConfig;
use listbot_core::{
    ConversationKey, ConversationState, ConversationStore, ImageRef, InputEvent, Item,
    ListbotError, MessageRef,
};

use crate::turn::Turn;

/// Everything a handler may look at during one turn.
pub struct Ctx<'a> {
    pub store: &'a dyn ConversationStore,
    pub config: &'a EngineConfig,
    pub key: ConversationKey,
    pub event: &'a InputEvent,
}

/// The event payload, stripped of identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Text(&'a str),
    Photo(&'a ImageRef),
    Button(&'a str),
}

impl<'a> Ctx<'a> {
    pub fn input(&self) -> Input<'a> {
        match self.event {
            InputEvent::Text { text, .. } => Input::Text(text.trim()),
            InputEvent::Photo { image, .. } => Input::Photo(image),
            InputEvent::ButtonSelection { payload, .. } => Input::Button(payload),
        }
    }

    /// Text or button payload, for states that accept both channels.
    pub fn choice(&self) -> Option<&'a str> {
        match self.input() {
            Input::Text(text) | Input::Button(text) => Some(text),
            Input::Photo(_) => None,
        }
    }

    /// The staged item of this conversation.
    pub async fn temp_item(&self) -> Result<Item, ListbotError> {
        self.store.get_temp_item(self.key).await?.ok_or_else(|| {
            ListbotError::validation("There is no item in progress, please start again with /additem")
        })
    }

    /// Message a prompt should thread to: the inbound message, or the stored
    /// message target when the event was a button press.
    pub async fn reply_target(&self) -> Result<Option<MessageRef>, ListbotError> {
        match self.event.message() {
            Some(message) => Ok(Some(message)),
            None => self.store.get_message_target(self.key).await,
        }
    }
}

/// Routes an event to the handler owning the state's category.
pub async fn dispatch(ctx: &Ctx<'_>, state: ConversationState) -> Result<Turn, ListbotError> {
    match state {
        ConversationState::Idle => idle::handle(ctx).await,
        ConversationState::AddOrEdit(step) => add_edit::handle(ctx, step).await,
        ConversationState::Query(step) => query::handle(ctx, step).await,
        ConversationState::Delete(step) => delete::handle(ctx, step).await,
        ConversationState::Edit(step) => edit::handle(ctx, step).await,
    }
}

/// Checks a name or tag supplied by the user and returns it trimmed.
pub fn validate_label(raw: &str, what: &str, max_len: usize) -> Result<String, ListbotError> {
    let label = raw.trim();
    if label.is_empty() {
        return Err(ListbotError::validation(format!("{what} cannot be empty")));
    }
    if label.starts_with('/') {
        return Err(ListbotError::validation(format!(
            "{what} cannot start with \"/\""
        )));
    }
    if label.len() > max_len {
        return Err(ListbotError::validation(format!(
            "{what} must be at most {max_len} characters"
        )));
    }
    Ok(label.to_string())
}
