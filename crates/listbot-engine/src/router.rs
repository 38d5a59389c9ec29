// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Target routing and the private-redirect protocol.
//!
//! A workflow started in a group never runs inline: the group is recorded as
//! the user's chat target and the user is sent a deep link into a private
//! chat. The private `/start <operation>` that link produces resumes the
//! workflow against the recorded group.

use listbot_core::{ChatId, Commit, ConversationState, ListbotError, Slot};
use tracing::{debug, info, warn};

use crate::command::Operation;
use crate::render::NO_ITEMS;
use crate::turn::Turn;
use crate::workflow::{Ctx, add_edit, delete, edit, query};

pub const REDIRECT_TEXT: &str = "Let's continue in a private chat so nobody else's messages get mixed in.";
pub const REDIRECT_LABEL: &str = "Continue privately";

/// Handles an operation-start command.
pub async fn begin(ctx: &Ctx<'_>, op: Operation) -> Result<Turn, ListbotError> {
    if ctx.key.is_private() {
        return enter(ctx, op, ctx.key.chat).await;
    }

    let group = ctx.key.chat;
    if op.needs_items() && ctx.store.list_item_names(group).await?.is_empty() {
        return Ok(Turn::reply().text(NO_ITEMS));
    }

    info!(op = %op, group = %group, "redirecting workflow to private chat");
    let commit = Commit::default().with_chat_target(Slot::Set(group));
    Ok(Turn::new(commit).redirect(REDIRECT_TEXT, REDIRECT_LABEL, op.to_string()))
}

/// Handles the private `/start <operation>` produced by a redirect.
pub async fn resume(ctx: &Ctx<'_>, op: Operation) -> Result<Turn, ListbotError> {
    match ctx.store.get_chat_target(ctx.key.user).await? {
        Some(target) => {
            debug!(op = %op, target = %target, "resuming redirected workflow");
            enter(ctx, op, target).await
        }
        None => Ok(Turn::reply().text(format!(
            "Please initiate {} in the chat you want to work on",
            op.command()
        ))),
    }
}

/// Enters an operation's first state, acting on behalf of `target`.
///
/// Any earlier staged item or query draft of this conversation is dropped.
pub async fn enter(ctx: &Ctx<'_>, op: Operation, target: ChatId) -> Result<Turn, ListbotError> {
    if op.needs_items() && ctx.store.list_item_names(target).await?.is_empty() {
        let commit = Commit::to(ConversationState::Idle)
            .with_temp_item(Slot::Clear)
            .with_query_draft(Slot::Clear)
            .with_chat_target(Slot::Clear)
            .with_message_target(Slot::Clear);
        return Ok(Turn::new(commit).clear_menu(NO_ITEMS, ctx.event.message()));
    }

    let mut turn = match op {
        Operation::AddItem => add_edit::enter(ctx, target).await?,
        Operation::Query => query::enter(ctx, target).await?,
        Operation::DeleteItem => delete::enter(ctx, target).await?,
        Operation::EditItem => edit::enter(ctx, target).await?,
    };

    let commit = &mut turn.commit;
    if commit.temp_item.is_keep() {
        commit.temp_item = Slot::Clear;
    }
    if commit.query_draft.is_keep() {
        commit.query_draft = Slot::Clear;
    }
    commit.message_target = Slot::Clear;
    commit.chat_target = Slot::Set(target);
    Ok(turn)
}

/// The chat whose items the current workflow acts on.
///
/// Falls back to the current chat when no target was recorded.
pub async fn target_chat(ctx: &Ctx<'_>) -> Result<ChatId, ListbotError> {
    match ctx.store.get_chat_target(ctx.key.user).await? {
        Some(target) => Ok(target),
        None => {
            warn!(chat = %ctx.key.chat, "no chat target recorded, using current chat");
            Ok(ctx.key.chat)
        }
    }
}
