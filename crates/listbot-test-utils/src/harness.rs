// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for driving conversations end to end.
//!
//! `TestHarness` wires an [`Engine`] to a [`MockTransport`] and either a
//! [`MemoryStore`] or a temp-file SQLite store, and offers one helper per
//! input channel so a test reads like the conversation it exercises.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use listbot_config::EngineConfig;
use listbot_config::model::StorageConfig;
use listbot_core::{
    ChatId, ConversationKey, ConversationState, ConversationStore, ImageRef, InputEvent, Item,
    ListbotError, MessageRef, UserId,
};
use listbot_engine::{Engine, TurnOutcome};
use listbot_storage::SqliteStore;

use crate::memory_store::MemoryStore;
use crate::mock_transport::{Delivery, MockTransport};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: EngineConfig,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            sqlite: false,
        }
    }

    /// Use a custom engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Back the engine with SQLite in a temp directory instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Build the harness, initializing the store.
    pub async fn build(self) -> Result<TestHarness, ListbotError> {
        let transport = Arc::new(MockTransport::new());
        let memory = Arc::new(MemoryStore::new());

        let mut temp_dir = None;
        let store: Arc<dyn ConversationStore> = if self.sqlite {
            let dir = tempfile::TempDir::new().map_err(ListbotError::storage)?;
            let config = StorageConfig {
                database_path: dir.path().join("test.db").to_string_lossy().to_string(),
                wal_mode: true,
            };
            temp_dir = Some(dir);
            Arc::new(SqliteStore::new(config))
        } else {
            memory.clone()
        };
        store.initialize().await?;

        let engine = Engine::new(store.clone(), transport.clone(), self.config);
        Ok(TestHarness {
            engine,
            store,
            memory,
            transport,
            next_message: AtomicI32::new(1),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete engine with mock adapters.
pub struct TestHarness {
    pub engine: Engine,
    pub store: Arc<dyn ConversationStore>,
    /// Failure-injection handle; only backs `store` for memory harnesses.
    pub memory: Arc<MemoryStore>,
    pub transport: Arc<MockTransport>,
    next_message: AtomicI32,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness on the in-memory store with default configuration.
    pub async fn new() -> Result<Self, ListbotError> {
        Self::builder().build().await
    }

    /// The private conversation of `user`.
    pub fn private(user: i64) -> ConversationKey {
        ConversationKey::new(ChatId(user), UserId(user))
    }

    /// `user`'s conversation inside group `chat`.
    pub fn group(chat: i64, user: i64) -> ConversationKey {
        ConversationKey::new(ChatId(chat), UserId(user))
    }

    fn message_id(&self) -> MessageRef {
        MessageRef(self.next_message.fetch_add(1, Ordering::SeqCst))
    }

    /// Sends text as `key`.
    pub async fn text(&self, key: ConversationKey, text: &str) -> TurnOutcome {
        let event = InputEvent::Text {
            chat: key.chat,
            user: key.user,
            text: text.to_string(),
            message: self.message_id(),
        };
        self.engine.handle(event).await
    }

    /// Sends a photo as `key`.
    pub async fn photo(&self, key: ConversationKey, image: &str) -> TurnOutcome {
        let event = InputEvent::Photo {
            chat: key.chat,
            user: key.user,
            image: ImageRef(image.to_string()),
            message: self.message_id(),
        };
        self.engine.handle(event).await
    }

    /// Presses an inline button carrying `payload` as `key`.
    pub async fn tap(&self, key: ConversationKey, payload: &str) -> TurnOutcome {
        let event = InputEvent::ButtonSelection {
            chat: key.chat,
            user: key.user,
            payload: payload.to_string(),
            selection_id: None,
        };
        self.engine.handle(event).await
    }

    /// Sends several texts in order, returning the last outcome.
    pub async fn texts(&self, key: ConversationKey, texts: &[&str]) -> TurnOutcome {
        let mut outcome = TurnOutcome::Unchanged;
        for text in texts {
            outcome = self.text(key, text).await;
        }
        outcome
    }

    pub async fn state(&self, key: ConversationKey) -> ConversationState {
        self.store
            .get_state(key)
            .await
            .expect("state should be readable")
    }

    pub async fn temp_item(&self, key: ConversationKey) -> Option<Item> {
        self.store
            .get_temp_item(key)
            .await
            .expect("temp item should be readable")
    }

    pub async fn item(&self, chat: ChatId, name: &str) -> Option<Item> {
        self.store
            .get_item(chat, name)
            .await
            .expect("item should be readable")
    }

    pub async fn chat_target(&self, user: UserId) -> Option<ChatId> {
        self.store
            .get_chat_target(user)
            .await
            .expect("chat target should be readable")
    }

    /// Stores an item directly, bypassing the conversation.
    pub async fn seed_item(&self, chat: ChatId, item: Item) {
        self.store
            .upsert_item(chat, &item)
            .await
            .expect("seeding should succeed");
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.transport.deliveries().await
    }

    pub async fn sent_texts(&self) -> Vec<String> {
        self.transport.texts().await
    }

    pub async fn last_delivery(&self) -> Option<Delivery> {
        self.transport.last().await
    }

    pub async fn clear(&self) {
        self.transport.clear().await;
    }
}
