// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation FSM state persistence.

use listbot_core::{ConversationKey, ConversationState, ListbotError};
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub(crate) fn write_state(conn: &Connection, key: ConversationKey, state: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO conversation_states (chat_id, user_id, state, updated_at)
         VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        params![key.chat.0, key.user.0, state],
    )?;
    Ok(())
}

/// Stored state of `key`; `Idle` when no row exists.
pub async fn get_state(db: &Database, key: ConversationKey) -> Result<ConversationState, ListbotError> {
    let raw: Option<String> = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT state FROM conversation_states WHERE chat_id = ?1 AND user_id = ?2",
                params![key.chat.0, key.user.0],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    match raw {
        Some(raw) => raw.parse(),
        None => Ok(ConversationState::Idle),
    }
}

pub async fn set_state(
    db: &Database,
    key: ConversationKey,
    state: ConversationState,
) -> Result<(), ListbotError> {
    let state = state.to_string();
    db.connection()
        .call(move |conn| write_state(conn, key, &state))
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listbot_core::{ChatId, FieldStep, UserId};

    fn key() -> ConversationKey {
        ConversationKey::new(ChatId(-100), UserId(7))
    }

    #[tokio::test]
    async fn absent_state_reads_as_idle() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(get_state(&db, key()).await.unwrap(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn set_state_overwrites_previous_value() {
        let db = Database::open_in_memory().await.unwrap();
        set_state(&db, key(), ConversationState::AddOrEdit(FieldStep::SetName))
            .await
            .unwrap();
        set_state(&db, key(), ConversationState::AddOrEdit(FieldStep::SetTags))
            .await
            .unwrap();
        assert_eq!(
            get_state(&db, key()).await.unwrap(),
            ConversationState::AddOrEdit(FieldStep::SetTags)
        );
    }

    #[tokio::test]
    async fn states_are_isolated_per_user_in_same_chat() {
        let db = Database::open_in_memory().await.unwrap();
        let other = ConversationKey::new(ChatId(-100), UserId(8));
        set_state(&db, key(), ConversationState::AddOrEdit(FieldStep::SetUrl))
            .await
            .unwrap();
        assert_eq!(get_state(&db, other).await.unwrap(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn corrupt_state_row_surfaces_as_error() {
        let db = Database::open_in_memory().await.unwrap();
        db.connection()
            .call(|conn| write_state(conn, key(), "bogus.state"))
            .await
            .unwrap();
        assert!(get_state(&db, key()).await.is_err());
    }
}
