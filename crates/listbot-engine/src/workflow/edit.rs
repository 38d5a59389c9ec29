// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Picking the item to edit. The chosen item is copied into the staging slot
//! and the field sub-machine takes over; the name stays fixed.

use listbot_core::{ChatId, Commit, ConversationState, EditStep, ListbotError, Slot};

use super::{Ctx, add_edit};
use crate::render::{item_details, single_column};
use crate::router::target_chat;
use crate::turn::Turn;

const PICK_PROMPT: &str = "Which item do you want to edit?";

pub async fn enter(ctx: &Ctx<'_>, target: ChatId) -> Result<Turn, ListbotError> {
    let names = ctx.store.list_item_names(target).await?;
    let commit = Commit::to(ConversationState::Edit(EditStep::GetItemToEdit));
    Ok(Turn::new(commit).options(PICK_PROMPT, single_column(names.iter().map(String::as_str))))
}

pub async fn handle(ctx: &Ctx<'_>, step: EditStep) -> Result<Turn, ListbotError> {
    match step {
        EditStep::GetItemToEdit => pick_item(ctx).await,
    }
}

async fn pick_item(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let target = target_chat(ctx).await?;
    let Some(name) = ctx.choice() else {
        return Err(ListbotError::validation("Please pick one of the listed items"));
    };

    let Some(item) = ctx.store.get_item(target, name).await? else {
        let names = ctx.store.list_item_names(target).await?;
        return Ok(Turn::rejected(&ListbotError::not_found("item", name))
            .options(PICK_PROMPT, single_column(names.iter().map(String::as_str))));
    };

    let details = item_details(&item);
    let commit = Commit::default().with_temp_item(Slot::Set(item));
    let ready = add_edit::ready(commit, ctx.event.message());
    Ok(Turn::new(ready.commit)
        .text(format!("Editing:\n{details}"))
        .extend(ready.effects))
}
