// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp item and query draft staging, one row per conversation identity.
//!
//! Payloads are stored as JSON; serialization happens outside the writer
//! thread so the closures only move strings.

use listbot_core::{ConversationKey, Item, ListbotError, QueryDraft};
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub(crate) fn write_temp_item(conn: &Connection, key: ConversationKey, payload: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO temp_items (chat_id, user_id, payload, updated_at)
         VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        params![key.chat.0, key.user.0, payload],
    )?;
    Ok(())
}

pub(crate) fn delete_temp_item(conn: &Connection, key: ConversationKey) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM temp_items WHERE chat_id = ?1 AND user_id = ?2",
        params![key.chat.0, key.user.0],
    )?;
    Ok(())
}

pub(crate) fn write_query_draft(
    conn: &Connection,
    key: ConversationKey,
    payload: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO query_drafts (chat_id, user_id, payload, updated_at)
         VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        params![key.chat.0, key.user.0, payload],
    )?;
    Ok(())
}

pub(crate) fn delete_query_draft(conn: &Connection, key: ConversationKey) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM query_drafts WHERE chat_id = ?1 AND user_id = ?2",
        params![key.chat.0, key.user.0],
    )?;
    Ok(())
}

async fn read_payload(
    db: &Database,
    sql: &'static str,
    key: ConversationKey,
) -> Result<Option<String>, ListbotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(sql, params![key.chat.0, key.user.0], |row| row.get(0))
                .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_temp_item(db: &Database, key: ConversationKey) -> Result<Option<Item>, ListbotError> {
    let payload = read_payload(
        db,
        "SELECT payload FROM temp_items WHERE chat_id = ?1 AND user_id = ?2",
        key,
    )
    .await?;
    Ok(payload.map(|p| serde_json::from_str(&p)).transpose()?)
}

/// Stores `item` as the staged record of `key`, replacing any previous one.
pub async fn set_temp_item(db: &Database, key: ConversationKey, item: &Item) -> Result<(), ListbotError> {
    let payload = serde_json::to_string(item)?;
    db.connection()
        .call(move |conn| write_temp_item(conn, key, &payload))
        .await
        .map_err(map_tr_err)
}

pub async fn clear_temp_item(db: &Database, key: ConversationKey) -> Result<(), ListbotError> {
    db.connection()
        .call(move |conn| delete_temp_item(conn, key))
        .await
        .map_err(map_tr_err)
}

pub async fn get_query_draft(
    db: &Database,
    key: ConversationKey,
) -> Result<Option<QueryDraft>, ListbotError> {
    let payload = read_payload(
        db,
        "SELECT payload FROM query_drafts WHERE chat_id = ?1 AND user_id = ?2",
        key,
    )
    .await?;
    Ok(payload.map(|p| serde_json::from_str(&p)).transpose()?)
}

pub async fn set_query_draft(
    db: &Database,
    key: ConversationKey,
    draft: &QueryDraft,
) -> Result<(), ListbotError> {
    let payload = serde_json::to_string(draft)?;
    db.connection()
        .call(move |conn| write_query_draft(conn, key, &payload))
        .await
        .map_err(map_tr_err)
}

pub async fn clear_query_draft(db: &Database, key: ConversationKey) -> Result<(), ListbotError> {
    db.connection()
        .call(move |conn| delete_query_draft(conn, key))
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listbot_core::{ChatId, ImageRef, QueryFilter, TagSet, UserId};

    fn key() -> ConversationKey {
        ConversationKey::new(ChatId(42), UserId(42))
    }

    #[tokio::test]
    async fn temp_item_round_trips_with_all_fields() {
        let db = Database::open_in_memory().await.unwrap();
        let mut item = Item::named("Cafe A");
        item.address = Some("1 Main St".into());
        item.add_image(ImageRef("photo-1".into()));
        item.tags = ["coffee", "brunch"].into_iter().collect::<TagSet>();

        set_temp_item(&db, key(), &item).await.unwrap();
        assert_eq!(get_temp_item(&db, key()).await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn new_temp_item_overwrites_instead_of_merging() {
        let db = Database::open_in_memory().await.unwrap();
        let mut first = Item::named("First");
        first.notes = Some("keep?".into());
        set_temp_item(&db, key(), &first).await.unwrap();
        set_temp_item(&db, key(), &Item::named("Second")).await.unwrap();

        let stored = get_temp_item(&db, key()).await.unwrap().unwrap();
        assert_eq!(stored, Item::named("Second"));
    }

    #[tokio::test]
    async fn cleared_temp_item_is_gone() {
        let db = Database::open_in_memory().await.unwrap();
        set_temp_item(&db, key(), &Item::named("x")).await.unwrap();
        clear_temp_item(&db, key()).await.unwrap();
        assert!(get_temp_item(&db, key()).await.unwrap().is_none());
        // Clearing twice is harmless.
        clear_temp_item(&db, key()).await.unwrap();
    }

    #[tokio::test]
    async fn query_draft_round_trips() {
        let db = Database::open_in_memory().await.unwrap();
        let draft = QueryDraft {
            filter: QueryFilter::TagOrName("coffee".into()),
        };
        set_query_draft(&db, key(), &draft).await.unwrap();
        assert_eq!(get_query_draft(&db, key()).await.unwrap(), Some(draft));
        clear_query_draft(&db, key()).await.unwrap();
        assert!(get_query_draft(&db, key()).await.unwrap().is_none());
    }
}
