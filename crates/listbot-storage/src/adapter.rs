// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use listbot_config::model::StorageConfig;
use listbot_core::{
    AdapterType, ChatId, Commit, ConversationKey, ConversationState, ConversationStore,
    HealthStatus, Item, ListbotError, MessageRef, PluginAdapter, QueryDraft, TagSet, UserId,
};

use crate::database::{self, Database};
use crate::queries;

/// SQLite-backed conversation store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened on the first call to
/// [`ConversationStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// The connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wraps an already opened database (used by tests and tools).
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::from(db),
        }
    }

    fn db(&self) -> Result<&Database, ListbotError> {
        self.db.get().ok_or_else(|| ListbotError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ListbotError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), ListbotError> {
        if let Some(db) = self.db.get() {
            database::checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn initialize(&self) -> Result<(), ListbotError> {
        let db =
            Database::open_with_options(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ListbotError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    // --- Conversation state ---

    async fn get_state(&self, key: ConversationKey) -> Result<ConversationState, ListbotError> {
        queries::states::get_state(self.db()?, key).await
    }

    async fn set_state(
        &self,
        key: ConversationKey,
        state: ConversationState,
    ) -> Result<(), ListbotError> {
        queries::states::set_state(self.db()?, key, state).await
    }

    // --- Staging ---

    async fn get_temp_item(&self, key: ConversationKey) -> Result<Option<Item>, ListbotError> {
        queries::staging::get_temp_item(self.db()?, key).await
    }

    async fn set_temp_item(&self, key: ConversationKey, item: &Item) -> Result<(), ListbotError> {
        queries::staging::set_temp_item(self.db()?, key, item).await
    }

    async fn clear_temp_item(&self, key: ConversationKey) -> Result<(), ListbotError> {
        queries::staging::clear_temp_item(self.db()?, key).await
    }

    async fn get_query_draft(
        &self,
        key: ConversationKey,
    ) -> Result<Option<QueryDraft>, ListbotError> {
        queries::staging::get_query_draft(self.db()?, key).await
    }

    async fn set_query_draft(
        &self,
        key: ConversationKey,
        draft: &QueryDraft,
    ) -> Result<(), ListbotError> {
        queries::staging::set_query_draft(self.db()?, key, draft).await
    }

    async fn clear_query_draft(&self, key: ConversationKey) -> Result<(), ListbotError> {
        queries::staging::clear_query_draft(self.db()?, key).await
    }

    // --- Items ---

    async fn list_item_names(&self, chat: ChatId) -> Result<Vec<String>, ListbotError> {
        queries::items::list_item_names(self.db()?, chat).await
    }

    async fn list_items(&self, chat: ChatId) -> Result<Vec<Item>, ListbotError> {
        queries::items::list_items(self.db()?, chat).await
    }

    async fn list_tags(&self, chat: ChatId) -> Result<TagSet, ListbotError> {
        queries::items::list_tags(self.db()?, chat).await
    }

    async fn get_item(&self, chat: ChatId, name: &str) -> Result<Option<Item>, ListbotError> {
        queries::items::get_item(self.db()?, chat, name).await
    }

    async fn upsert_item(&self, chat: ChatId, item: &Item) -> Result<(), ListbotError> {
        queries::items::upsert_item(self.db()?, chat, item).await
    }

    async fn delete_item(&self, chat: ChatId, name: &str) -> Result<(), ListbotError> {
        queries::items::delete_item(self.db()?, chat, name).await
    }

    // --- Targets ---

    async fn get_chat_target(&self, user: UserId) -> Result<Option<ChatId>, ListbotError> {
        queries::targets::get_chat_target(self.db()?, user).await
    }

    async fn set_chat_target(&self, user: UserId, chat: ChatId) -> Result<(), ListbotError> {
        queries::targets::set_chat_target(self.db()?, user, chat).await
    }

    async fn clear_chat_target(&self, user: UserId) -> Result<(), ListbotError> {
        queries::targets::clear_chat_target(self.db()?, user).await
    }

    async fn get_message_target(
        &self,
        key: ConversationKey,
    ) -> Result<Option<MessageRef>, ListbotError> {
        queries::targets::get_message_target(self.db()?, key).await
    }

    async fn set_message_target(
        &self,
        key: ConversationKey,
        message: MessageRef,
    ) -> Result<(), ListbotError> {
        queries::targets::set_message_target(self.db()?, key, message).await
    }

    async fn clear_message_target(&self, key: ConversationKey) -> Result<(), ListbotError> {
        queries::targets::clear_message_target(self.db()?, key).await
    }

    async fn commit(&self, key: ConversationKey, commit: Commit) -> Result<(), ListbotError> {
        queries::commit::apply(self.db()?, key, commit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listbot_core::{FieldStep, Slot};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_reflects_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        let key = ConversationKey::new(ChatId(1), UserId(1));
        assert!(store.get_state(key).await.is_err());
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("persist.db");
        let path = db_path.to_str().unwrap();
        let key = ConversationKey::new(ChatId(-7), UserId(3));

        let store = SqliteStore::new(make_config(path));
        store.initialize().await.unwrap();
        let commit = Commit::to(ConversationState::AddOrEdit(FieldStep::SetAddress))
            .with_temp_item(Slot::Set(Item::named("Cafe A")));
        store.commit(key, commit).await.unwrap();
        store.shutdown().await.unwrap();
        drop(store);

        let reopened = SqliteStore::new(make_config(path));
        reopened.initialize().await.unwrap();
        assert_eq!(
            reopened.get_state(key).await.unwrap(),
            ConversationState::AddOrEdit(FieldStep::SetAddress)
        );
        assert_eq!(
            reopened.get_temp_item(key).await.unwrap(),
            Some(Item::named("Cafe A"))
        );
    }
}
