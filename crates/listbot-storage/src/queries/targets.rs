// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat targets (per user) and message targets (per conversation identity).

use listbot_core::{ChatId, ConversationKey, ListbotError, MessageRef, UserId};
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub(crate) fn write_chat_target(conn: &Connection, user: UserId, chat: ChatId) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO chat_targets (user_id, chat_id, updated_at)
         VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        params![user.0, chat.0],
    )?;
    Ok(())
}

pub(crate) fn delete_chat_target(conn: &Connection, user: UserId) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM chat_targets WHERE user_id = ?1", params![user.0])?;
    Ok(())
}

pub(crate) fn write_message_target(
    conn: &Connection,
    key: ConversationKey,
    message: MessageRef,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO message_targets (chat_id, user_id, message_id)
         VALUES (?1, ?2, ?3)",
        params![key.chat.0, key.user.0, message.0],
    )?;
    Ok(())
}

pub(crate) fn delete_message_target(conn: &Connection, key: ConversationKey) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM message_targets WHERE chat_id = ?1 AND user_id = ?2",
        params![key.chat.0, key.user.0],
    )?;
    Ok(())
}

pub async fn get_chat_target(db: &Database, user: UserId) -> Result<Option<ChatId>, ListbotError> {
    let chat: Option<i64> = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT chat_id FROM chat_targets WHERE user_id = ?1",
                params![user.0],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(chat.map(ChatId))
}

pub async fn set_chat_target(db: &Database, user: UserId, chat: ChatId) -> Result<(), ListbotError> {
    db.connection()
        .call(move |conn| write_chat_target(conn, user, chat))
        .await
        .map_err(map_tr_err)
}

pub async fn clear_chat_target(db: &Database, user: UserId) -> Result<(), ListbotError> {
    db.connection()
        .call(move |conn| delete_chat_target(conn, user))
        .await
        .map_err(map_tr_err)
}

pub async fn get_message_target(
    db: &Database,
    key: ConversationKey,
) -> Result<Option<MessageRef>, ListbotError> {
    let message: Option<i32> = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT message_id FROM message_targets WHERE chat_id = ?1 AND user_id = ?2",
                params![key.chat.0, key.user.0],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(message.map(MessageRef))
}

pub async fn set_message_target(
    db: &Database,
    key: ConversationKey,
    message: MessageRef,
) -> Result<(), ListbotError> {
    db.connection()
        .call(move |conn| write_message_target(conn, key, message))
        .await
        .map_err(map_tr_err)
}

pub async fn clear_message_target(db: &Database, key: ConversationKey) -> Result<(), ListbotError> {
    db.connection()
        .call(move |conn| delete_message_target(conn, key))
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chat_target_is_keyed_by_user_only() {
        let db = Database::open_in_memory().await.unwrap();
        set_chat_target(&db, UserId(5), ChatId(-100)).await.unwrap();
        set_chat_target(&db, UserId(5), ChatId(-200)).await.unwrap();
        assert_eq!(get_chat_target(&db, UserId(5)).await.unwrap(), Some(ChatId(-200)));
        assert_eq!(get_chat_target(&db, UserId(6)).await.unwrap(), None);

        clear_chat_target(&db, UserId(5)).await.unwrap();
        assert_eq!(get_chat_target(&db, UserId(5)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn message_target_round_trips() {
        let db = Database::open_in_memory().await.unwrap();
        let key = ConversationKey::new(ChatId(5), UserId(5));
        assert_eq!(get_message_target(&db, key).await.unwrap(), None);
        set_message_target(&db, key, MessageRef(99)).await.unwrap();
        assert_eq!(get_message_target(&db, key).await.unwrap(), Some(MessageRef(99)));
        clear_message_target(&db, key).await.unwrap();
        assert_eq!(get_message_target(&db, key).await.unwrap(), None);
    }
}
