// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item repository operations, scoped by chat.

use listbot_core::{ChatId, Item, ListbotError, TagSet};
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Insert-or-replace by `(chat_id, name)`. The payload is replaced whole;
/// `created_at` survives the overwrite.
pub(crate) fn write_item(conn: &Connection, chat: ChatId, name: &str, payload: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO items (chat_id, name, payload) VALUES (?1, ?2, ?3)
         ON CONFLICT(chat_id, name) DO UPDATE SET
             payload = excluded.payload,
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        params![chat.0, name, payload],
    )?;
    Ok(())
}

pub(crate) fn remove_item(conn: &Connection, chat: ChatId, name: &str) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM items WHERE chat_id = ?1 AND name = ?2",
        params![chat.0, name],
    )?;
    Ok(())
}

/// Names of the items in `chat`, lexicographically ordered.
pub async fn list_item_names(db: &Database, chat: ChatId) -> Result<Vec<String>, ListbotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT name FROM items WHERE chat_id = ?1 ORDER BY name")?;
            let rows = stmt.query_map(params![chat.0], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_items(db: &Database, chat: ChatId) -> Result<Vec<Item>, ListbotError> {
    let payloads: Vec<String> = db
        .connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT payload FROM items WHERE chat_id = ?1 ORDER BY name")?;
            let rows = stmt.query_map(params![chat.0], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)?;
    payloads
        .iter()
        .map(|p| serde_json::from_str(p).map_err(ListbotError::from))
        .collect()
}

/// Distinct tags over every item in `chat`.
pub async fn list_tags(db: &Database, chat: ChatId) -> Result<TagSet, ListbotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT tag.value
                 FROM items, json_each(items.payload, '$.tags') AS tag
                 WHERE items.chat_id = ?1",
            )?;
            let rows = stmt.query_map(params![chat.0], |row| row.get::<_, String>(0))?;
            rows.collect::<Result<TagSet, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_item(db: &Database, chat: ChatId, name: &str) -> Result<Option<Item>, ListbotError> {
    let name = name.to_string();
    let payload: Option<String> = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT payload FROM items WHERE chat_id = ?1 AND name = ?2",
                params![chat.0, name],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(payload.map(|p| serde_json::from_str(&p)).transpose()?)
}

pub async fn upsert_item(db: &Database, chat: ChatId, item: &Item) -> Result<(), ListbotError> {
    let name = item.name.clone();
    let payload = serde_json::to_string(item)?;
    db.connection()
        .call(move |conn| write_item(conn, chat, &name, &payload))
        .await
        .map_err(map_tr_err)
}

pub async fn delete_item(db: &Database, chat: ChatId, name: &str) -> Result<(), ListbotError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| remove_item(conn, chat, &name))
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(name: &str, tags: &[&str]) -> Item {
        let mut item = Item::named(name);
        item.tags = tags.iter().copied().collect();
        item
    }

    #[tokio::test]
    async fn names_are_listed_in_lexicographic_order() {
        let db = Database::open_in_memory().await.unwrap();
        for name in ["Zeta", "Alpha", "Mid"] {
            upsert_item(&db, ChatId(1), &Item::named(name)).await.unwrap();
        }
        assert_eq!(
            list_item_names(&db, ChatId(1)).await.unwrap(),
            vec!["Alpha", "Mid", "Zeta"]
        );
    }

    #[tokio::test]
    async fn items_are_scoped_by_chat() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_item(&db, ChatId(1), &Item::named("Cafe A")).await.unwrap();
        assert!(list_items(&db, ChatId(2)).await.unwrap().is_empty());
        assert!(get_item(&db, ChatId(2), "Cafe A").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_all_fields() {
        let db = Database::open_in_memory().await.unwrap();
        let mut original = tagged("Cafe A", &["coffee"]);
        original.notes = Some("old notes".into());
        upsert_item(&db, ChatId(1), &original).await.unwrap();

        let replacement = Item::named("Cafe A");
        upsert_item(&db, ChatId(1), &replacement).await.unwrap();

        let stored = get_item(&db, ChatId(1), "Cafe A").await.unwrap().unwrap();
        assert_eq!(stored, replacement);
        assert_eq!(list_items(&db, ChatId(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tag_vocabulary_is_union_over_items() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_item(&db, ChatId(1), &tagged("A", &["coffee", "brunch"])).await.unwrap();
        upsert_item(&db, ChatId(1), &tagged("B", &["coffee", "bar"])).await.unwrap();
        upsert_item(&db, ChatId(2), &tagged("C", &["elsewhere"])).await.unwrap();

        let tags = list_tags(&db, ChatId(1)).await.unwrap();
        assert_eq!(tags.joined(","), "bar,brunch,coffee");
    }

    #[tokio::test]
    async fn delete_removes_only_named_item() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_item(&db, ChatId(1), &Item::named("A")).await.unwrap();
        upsert_item(&db, ChatId(1), &Item::named("B")).await.unwrap();
        delete_item(&db, ChatId(1), "A").await.unwrap();
        assert_eq!(list_item_names(&db, ChatId(1)).await.unwrap(), vec!["B"]);
    }
}
