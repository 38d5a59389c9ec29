// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The write-set a single turn persists.
//!
//! Handlers never write to the store directly. They describe every mutation
//! of a turn in one [`Commit`], which the store applies atomically so that
//! the stored state and the staged data always move together.

use crate::item::{Item, QueryDraft};
use crate::state::ConversationState;
use crate::types::{ChatId, MessageRef};

/// What to do with one stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Overwrite with a new value.
    Set(T),
    /// Remove the stored value.
    Clear,
}

impl<T> Slot<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Slot::Keep)
    }
}

/// All mutations of one turn. An empty commit writes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Next FSM state of the conversation identity.
    pub state: Option<ConversationState>,
    /// Staged record of the conversation identity.
    pub temp_item: Slot<Item>,
    /// Query filter of the conversation identity.
    pub query_draft: Slot<QueryDraft>,
    /// Chat the user is acting on behalf of (keyed by user only).
    pub chat_target: Slot<ChatId>,
    /// Message follow-up prompts thread to.
    pub message_target: Slot<MessageRef>,
    /// Record to insert or overwrite.
    pub upsert: Option<(ChatId, Item)>,
    /// Record to delete, by name.
    pub delete: Option<(ChatId, String)>,
}

impl Commit {
    /// A commit that only moves the state.
    pub fn to(state: ConversationState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.temp_item.is_keep()
            && self.query_draft.is_keep()
            && self.chat_target.is_keep()
            && self.message_target.is_keep()
            && self.upsert.is_none()
            && self.delete.is_none()
    }

    pub fn with_temp_item(mut self, slot: Slot<Item>) -> Self {
        self.temp_item = slot;
        self
    }

    pub fn with_query_draft(mut self, slot: Slot<QueryDraft>) -> Self {
        self.query_draft = slot;
        self
    }

    pub fn with_chat_target(mut self, slot: Slot<ChatId>) -> Self {
        self.chat_target = slot;
        self
    }

    pub fn with_message_target(mut self, slot: Slot<MessageRef>) -> Self {
        self.message_target = slot;
        self
    }

    pub fn with_upsert(mut self, chat: ChatId, item: Item) -> Self {
        self.upsert = Some((chat, item));
        self
    }

    pub fn with_delete(mut self, chat: ChatId, name: impl Into<String>) -> Self {
        self.delete = Some((chat, name.into()));
        self
    }
}
