// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation store.
//!
//! All maps live behind one mutex, so a commit is applied atomically just
//! like the SQLite transaction. Failure injection makes every call (or only
//! commits) return a storage error.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use listbot_core::{
    AdapterType, ChatId, Commit, ConversationKey, ConversationState, ConversationStore,
    HealthStatus, Item, ListbotError, MessageRef, PluginAdapter, QueryDraft, Slot, UserId,
};

#[derive(Default)]
struct Inner {
    states: HashMap<ConversationKey, ConversationState>,
    temp_items: HashMap<ConversationKey, Item>,
    drafts: HashMap<ConversationKey, QueryDraft>,
    message_targets: HashMap<ConversationKey, MessageRef>,
    chat_targets: HashMap<UserId, ChatId>,
    items: HashMap<ChatId, BTreeMap<String, Item>>,
}

fn apply_slot<K: std::hash::Hash + Eq, V>(map: &mut HashMap<K, V>, key: K, slot: Slot<V>) {
    match slot {
        Slot::Keep => {}
        Slot::Set(value) => {
            map.insert(key, value);
        }
        Slot::Clear => {
            map.remove(&key);
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    failing: AtomicBool,
    failing_commits: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, every operation fails with a storage error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// When `true`, only `commit` fails; reads keep working.
    pub fn set_failing_commits(&self, failing: bool) {
        self.failing_commits.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ListbotError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ListbotError::storage("memory store is failing"));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ListbotError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("failing on purpose".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), ListbotError> {
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn initialize(&self) -> Result<(), ListbotError> {
        self.check()
    }

    async fn get_state(&self, key: ConversationKey) -> Result<ConversationState, ListbotError> {
        self.check()?;
        Ok(self
            .inner
            .lock()
            .await
            .states
            .get(&key)
            .copied()
            .unwrap_or_default())
    }

    async fn set_state(
        &self,
        key: ConversationKey,
        state: ConversationState,
    ) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.states.insert(key, state);
        Ok(())
    }

    async fn get_temp_item(&self, key: ConversationKey) -> Result<Option<Item>, ListbotError> {
        self.check()?;
        Ok(self.inner.lock().await.temp_items.get(&key).cloned())
    }

    async fn set_temp_item(&self, key: ConversationKey, item: &Item) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.temp_items.insert(key, item.clone());
        Ok(())
    }

    async fn clear_temp_item(&self, key: ConversationKey) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.temp_items.remove(&key);
        Ok(())
    }

    async fn get_query_draft(
        &self,
        key: ConversationKey,
    ) -> Result<Option<QueryDraft>, ListbotError> {
        self.check()?;
        Ok(self.inner.lock().await.drafts.get(&key).cloned())
    }

    async fn set_query_draft(
        &self,
        key: ConversationKey,
        draft: &QueryDraft,
    ) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.drafts.insert(key, draft.clone());
        Ok(())
    }

    async fn clear_query_draft(&self, key: ConversationKey) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.drafts.remove(&key);
        Ok(())
    }

    async fn list_item_names(&self, chat: ChatId) -> Result<Vec<String>, ListbotError> {
        self.check()?;
        Ok(self
            .inner
            .lock()
            .await
            .items
            .get(&chat)
            .map(|items| items.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_items(&self, chat: ChatId) -> Result<Vec<Item>, ListbotError> {
        self.check()?;
        Ok(self
            .inner
            .lock()
            .await
            .items
            .get(&chat)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_item(&self, chat: ChatId, name: &str) -> Result<Option<Item>, ListbotError> {
        self.check()?;
        Ok(self
            .inner
            .lock()
            .await
            .items
            .get(&chat)
            .and_then(|items| items.get(name).cloned()))
    }

    async fn upsert_item(&self, chat: ChatId, item: &Item) -> Result<(), ListbotError> {
        self.check()?;
        self.inner
            .lock()
            .await
            .items
            .entry(chat)
            .or_default()
            .insert(item.name.clone(), item.clone());
        Ok(())
    }

    async fn delete_item(&self, chat: ChatId, name: &str) -> Result<(), ListbotError> {
        self.check()?;
        if let Some(items) = self.inner.lock().await.items.get_mut(&chat) {
            items.remove(name);
        }
        Ok(())
    }

    async fn get_chat_target(&self, user: UserId) -> Result<Option<ChatId>, ListbotError> {
        self.check()?;
        Ok(self.inner.lock().await.chat_targets.get(&user).copied())
    }

    async fn set_chat_target(&self, user: UserId, chat: ChatId) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.chat_targets.insert(user, chat);
        Ok(())
    }

    async fn clear_chat_target(&self, user: UserId) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.chat_targets.remove(&user);
        Ok(())
    }

    async fn get_message_target(
        &self,
        key: ConversationKey,
    ) -> Result<Option<MessageRef>, ListbotError> {
        self.check()?;
        Ok(self.inner.lock().await.message_targets.get(&key).copied())
    }

    async fn set_message_target(
        &self,
        key: ConversationKey,
        message: MessageRef,
    ) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.message_targets.insert(key, message);
        Ok(())
    }

    async fn clear_message_target(&self, key: ConversationKey) -> Result<(), ListbotError> {
        self.check()?;
        self.inner.lock().await.message_targets.remove(&key);
        Ok(())
    }

    async fn commit(&self, key: ConversationKey, commit: Commit) -> Result<(), ListbotError> {
        self.check()?;
        if self.failing_commits.load(Ordering::SeqCst) {
            return Err(ListbotError::storage("memory store rejects commits"));
        }

        let mut inner = self.inner.lock().await;
        if let Some((chat, item)) = commit.upsert {
            inner
                .items
                .entry(chat)
                .or_default()
                .insert(item.name.clone(), item);
        }
        if let Some((chat, name)) = commit.delete {
            if let Some(items) = inner.items.get_mut(&chat) {
                items.remove(&name);
            }
        }
        apply_slot(&mut inner.temp_items, key, commit.temp_item);
        apply_slot(&mut inner.drafts, key, commit.query_draft);
        apply_slot(&mut inner.chat_targets, key.user, commit.chat_target);
        apply_slot(&mut inner.message_targets, key, commit.message_target);
        if let Some(state) = commit.state {
            inner.states.insert(key, state);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listbot_core::FieldStep;

    fn key() -> ConversationKey {
        ConversationKey::new(ChatId(5), UserId(5))
    }

    #[tokio::test]
    async fn absent_state_reads_as_idle() {
        let store = MemoryStore::new();
        assert!(store.get_state(key()).await.unwrap().is_idle());
    }

    #[tokio::test]
    async fn commit_applies_state_and_staging_together() {
        let store = MemoryStore::new();
        let commit = Commit::to(ConversationState::AddOrEdit(FieldStep::ReadyForNextAction))
            .with_temp_item(Slot::Set(Item::named("Cafe A")))
            .with_chat_target(Slot::Set(ChatId(-10)));
        store.commit(key(), commit).await.unwrap();

        assert_eq!(
            store.get_state(key()).await.unwrap(),
            ConversationState::AddOrEdit(FieldStep::ReadyForNextAction)
        );
        assert_eq!(
            store.get_temp_item(key()).await.unwrap(),
            Some(Item::named("Cafe A"))
        );
        assert_eq!(
            store.get_chat_target(UserId(5)).await.unwrap(),
            Some(ChatId(-10))
        );
    }

    #[tokio::test]
    async fn failing_commit_writes_nothing() {
        let store = MemoryStore::new();
        store.set_failing_commits(true);
        let commit = Commit::to(ConversationState::AddOrEdit(FieldStep::SetName));
        assert!(store.commit(key(), commit).await.is_err());
        assert!(store.get_state(key()).await.unwrap().is_idle());
    }

    #[tokio::test]
    async fn item_names_are_sorted() {
        let store = MemoryStore::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            store.upsert_item(ChatId(1), &Item::named(name)).await.unwrap();
        }
        assert_eq!(
            store.list_item_names(ChatId(1)).await.unwrap(),
            vec!["Alpha", "Mid", "Zeta"]
        );
    }
}
