// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence capability set consumed by the conversation engine.

use async_trait::async_trait;
use tracing::debug;

use crate::commit::{Commit, Slot};
use crate::error::ListbotError;
use crate::item::{Item, QueryDraft};
use crate::state::ConversationState;
use crate::tags::TagSet;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, ConversationKey, MessageRef, UserId};

/// Durable key-value storage for conversation state and item records.
///
/// Per-identity values (state, temp item, query draft, message target) are
/// keyed by [`ConversationKey`]; the chat target is keyed by user; items are
/// scoped by chat.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Initializes the backend (migrations, connections).
    async fn initialize(&self) -> Result<(), ListbotError>;

    /// Stored FSM state; `Idle` when nothing is stored.
    async fn get_state(&self, key: ConversationKey) -> Result<ConversationState, ListbotError>;
    async fn set_state(
        &self,
        key: ConversationKey,
        state: ConversationState,
    ) -> Result<(), ListbotError>;

    async fn get_temp_item(&self, key: ConversationKey) -> Result<Option<Item>, ListbotError>;
    async fn set_temp_item(&self, key: ConversationKey, item: &Item) -> Result<(), ListbotError>;
    async fn clear_temp_item(&self, key: ConversationKey) -> Result<(), ListbotError>;

    async fn get_query_draft(
        &self,
        key: ConversationKey,
    ) -> Result<Option<QueryDraft>, ListbotError>;
    async fn set_query_draft(
        &self,
        key: ConversationKey,
        draft: &QueryDraft,
    ) -> Result<(), ListbotError>;
    async fn clear_query_draft(&self, key: ConversationKey) -> Result<(), ListbotError>;

    /// Item names of a chat, in lexicographic order.
    async fn list_item_names(&self, chat: ChatId) -> Result<Vec<String>, ListbotError>;
    /// Items of a chat, ordered by name.
    async fn list_items(&self, chat: ChatId) -> Result<Vec<Item>, ListbotError>;
    async fn get_item(&self, chat: ChatId, name: &str) -> Result<Option<Item>, ListbotError>;
    /// Inserts the item or replaces the stored item of the same name entirely.
    async fn upsert_item(&self, chat: ChatId, item: &Item) -> Result<(), ListbotError>;
    async fn delete_item(&self, chat: ChatId, name: &str) -> Result<(), ListbotError>;

    /// Tag vocabulary of a chat: the union of the tags of all its items.
    async fn list_tags(&self, chat: ChatId) -> Result<TagSet, ListbotError> {
        let mut tags = TagSet::new();
        for item in self.list_items(chat).await? {
            tags.extend_from(&item.tags);
        }
        Ok(tags)
    }

    async fn get_chat_target(&self, user: UserId) -> Result<Option<ChatId>, ListbotError>;
    async fn set_chat_target(&self, user: UserId, chat: ChatId) -> Result<(), ListbotError>;
    async fn clear_chat_target(&self, user: UserId) -> Result<(), ListbotError>;

    async fn get_message_target(
        &self,
        key: ConversationKey,
    ) -> Result<Option<MessageRef>, ListbotError>;
    async fn set_message_target(
        &self,
        key: ConversationKey,
        message: MessageRef,
    ) -> Result<(), ListbotError>;
    async fn clear_message_target(&self, key: ConversationKey) -> Result<(), ListbotError>;

    /// Applies every mutation of one turn.
    ///
    /// Backends with transactions override this to apply the commit
    /// atomically. This fallback writes data before state, so an interrupted
    /// commit never advances the state past data that was not persisted.
    async fn commit(&self, key: ConversationKey, commit: Commit) -> Result<(), ListbotError> {
        if commit.is_empty() {
            return Ok(());
        }
        debug!(key = %key, "applying commit sequentially");

        if let Some((chat, item)) = &commit.upsert {
            self.upsert_item(*chat, item).await?;
        }
        if let Some((chat, name)) = &commit.delete {
            self.delete_item(*chat, name).await?;
        }
        match &commit.temp_item {
            Slot::Keep => {}
            Slot::Set(item) => self.set_temp_item(key, item).await?,
            Slot::Clear => self.clear_temp_item(key).await?,
        }
        match &commit.query_draft {
            Slot::Keep => {}
            Slot::Set(draft) => self.set_query_draft(key, draft).await?,
            Slot::Clear => self.clear_query_draft(key).await?,
        }
        match &commit.chat_target {
            Slot::Keep => {}
            Slot::Set(chat) => self.set_chat_target(key.user, *chat).await?,
            Slot::Clear => self.clear_chat_target(key.user).await?,
        }
        match &commit.message_target {
            Slot::Keep => {}
            Slot::Set(message) => self.set_message_target(key, *message).await?,
            Slot::Clear => self.clear_message_target(key).await?,
        }
        if let Some(state) = commit.state {
            self.set_state(key, state).await?;
        }
        Ok(())
    }
}
