// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic application of a turn's write-set.

use listbot_core::{ChatId, Commit, ConversationKey, ListbotError, MessageRef, Slot};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::queries::{items, staging, states, targets};

/// A [`Commit`] with every payload already serialized, so the transaction
/// closure only moves plain values onto the writer thread.
struct SerializedCommit {
    state: Option<String>,
    temp_item: Slot<String>,
    query_draft: Slot<String>,
    chat_target: Slot<ChatId>,
    message_target: Slot<MessageRef>,
    upsert: Option<(ChatId, String, String)>,
    delete: Option<(ChatId, String)>,
}

impl SerializedCommit {
    fn new(commit: Commit) -> Result<Self, ListbotError> {
        Ok(Self {
            state: commit.state.map(|s| s.to_string()),
            temp_item: serialize_slot(commit.temp_item)?,
            query_draft: serialize_slot(commit.query_draft)?,
            chat_target: commit.chat_target,
            message_target: commit.message_target,
            upsert: commit
                .upsert
                .map(|(chat, item)| {
                    serde_json::to_string(&item).map(|payload| (chat, item.name, payload))
                })
                .transpose()?,
            delete: commit.delete,
        })
    }
}

fn serialize_slot<T: serde::Serialize>(slot: Slot<T>) -> Result<Slot<String>, ListbotError> {
    Ok(match slot {
        Slot::Keep => Slot::Keep,
        Slot::Set(value) => Slot::Set(serde_json::to_string(&value)?),
        Slot::Clear => Slot::Clear,
    })
}

/// Applies `commit` for `key` in a single transaction.
///
/// Either every mutation lands or none does, so the stored state can never
/// run ahead of (or fall behind) the staged data it describes.
pub async fn apply(db: &Database, key: ConversationKey, commit: Commit) -> Result<(), ListbotError> {
    if commit.is_empty() {
        return Ok(());
    }
    let commit = SerializedCommit::new(commit)?;

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            if let Some((chat, name, payload)) = &commit.upsert {
                items::write_item(&tx, *chat, name, payload)?;
            }
            if let Some((chat, name)) = &commit.delete {
                items::remove_item(&tx, *chat, name)?;
            }
            match &commit.temp_item {
                Slot::Keep => {}
                Slot::Set(payload) => staging::write_temp_item(&tx, key, payload)?,
                Slot::Clear => staging::delete_temp_item(&tx, key)?,
            }
            match &commit.query_draft {
                Slot::Keep => {}
                Slot::Set(payload) => staging::write_query_draft(&tx, key, payload)?,
                Slot::Clear => staging::delete_query_draft(&tx, key)?,
            }
            match commit.chat_target {
                Slot::Keep => {}
                Slot::Set(chat) => targets::write_chat_target(&tx, key.user, chat)?,
                Slot::Clear => targets::delete_chat_target(&tx, key.user)?,
            }
            match commit.message_target {
                Slot::Keep => {}
                Slot::Set(message) => targets::write_message_target(&tx, key, message)?,
                Slot::Clear => targets::delete_message_target(&tx, key)?,
            }
            if let Some(state) = &commit.state {
                states::write_state(&tx, key, state)?;
            }

            tx.commit()
        })
        .await
        .map_err(map_tr_err)?;

    debug!(key = %key, "commit applied");
    Ok(())
}
