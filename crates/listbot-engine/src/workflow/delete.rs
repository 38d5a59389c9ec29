// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deleting an item. The selected item is staged between `Select` and
//! `Confirm` so the confirmation does not depend on a second payload.

use listbot_core::{ChatId, Commit, ConversationState, DeleteStep, ListbotError, Slot};

use super::{Ctx, Input};
use crate::render::{NO, NO_ITEMS, PICK_FROM_OPTIONS, YES, single_column, yes_no_rows};
use crate::router::target_chat;
use crate::turn::Turn;

const PICK_PROMPT: &str = "Which item do you want to delete?";

fn at(step: DeleteStep) -> ConversationState {
    ConversationState::Delete(step)
}

pub async fn enter(ctx: &Ctx<'_>, target: ChatId) -> Result<Turn, ListbotError> {
    let names = ctx.store.list_item_names(target).await?;
    Ok(Turn::new(Commit::to(at(DeleteStep::Select)))
        .options(PICK_PROMPT, single_column(names.iter().map(String::as_str))))
}

pub async fn handle(ctx: &Ctx<'_>, step: DeleteStep) -> Result<Turn, ListbotError> {
    match step {
        DeleteStep::Select => select(ctx).await,
        DeleteStep::Confirm => confirm(ctx).await,
    }
}

async fn select(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let target = target_chat(ctx).await?;
    let Some(name) = ctx.choice() else {
        return Err(ListbotError::validation("Please pick one of the listed items"));
    };

    let Some(item) = ctx.store.get_item(target, name).await? else {
        let names = ctx.store.list_item_names(target).await?;
        return Ok(Turn::rejected(&ListbotError::not_found("item", name))
            .options(PICK_PROMPT, single_column(names.iter().map(String::as_str))));
    };

    let prompt = format!("Are you sure you want to delete {}?", item.name);
    let commit = Commit::to(at(DeleteStep::Confirm)).with_temp_item(Slot::Set(item));
    Ok(Turn::new(commit).options(prompt, yes_no_rows()))
}

async fn confirm(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    match ctx.input() {
        Input::Button(YES) => {
            let item = ctx.temp_item().await?;
            let target = target_chat(ctx).await?;
            let commit = Commit::to(ConversationState::Idle)
                .with_temp_item(Slot::Clear)
                .with_chat_target(Slot::Clear)
                .with_delete(target, item.name.clone());
            Ok(Turn::new(commit).text(format!("{} has been deleted", item.name)))
        }
        Input::Button(NO) => {
            let target = target_chat(ctx).await?;
            let names = ctx.store.list_item_names(target).await?;
            if names.is_empty() {
                let commit = Commit::to(ConversationState::Idle)
                    .with_temp_item(Slot::Clear)
                    .with_chat_target(Slot::Clear);
                return Ok(Turn::new(commit).text(NO_ITEMS));
            }
            let commit = Commit::to(at(DeleteStep::Select)).with_temp_item(Slot::Clear);
            Ok(Turn::new(commit)
                .options(PICK_PROMPT, single_column(names.iter().map(String::as_str))))
        }
        _ => {
            let name = ctx.temp_item().await?.name;
            Ok(Turn::refuse().text(PICK_FROM_OPTIONS).options(
                format!("Are you sure you want to delete {name}?"),
                yes_no_rows(),
            ))
        }
    }
}
