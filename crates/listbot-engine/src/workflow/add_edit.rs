// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The field sub-machine shared by adding and editing an item.
//!
//! States expecting one input channel reject every other channel without
//! touching the staged item. `SetTags` is the only dual-channel state.

use listbot_core::{
    ChatId, Commit, ConversationState, FieldStep, InlineOption, Item, ListbotError, MessageRef,
    Slot, TagSet,
};
use tracing::debug;

use super::{Ctx, Input, validate_label};
use crate::render::{
    DONE, MenuAction, NEXT_ACTION, NO, PICK_FROM_MENU, PICK_FROM_OPTIONS, YES, field_menu_rows,
    is_done, item_details, tag_rows, yes_no_rows,
};
use crate::router::target_chat;
use crate::turn::{Effect, Turn};

const NAME_PROMPT: &str = "Please enter the name of the item to begin";
const ADD_TAG_PROMPT: &str = "Send a tag to be added. (Can be used to query your record of items)\nType new or pick from existing\n\nPress \"/done\" once done!";
const REMOVE_TAG_PROMPT: &str = "Select a tag to remove\n\nPress \"/done\" once done!";
const EXISTING_TAGS: &str = "Existing tags:";
const NO_TAGS: &str = "No tags found. Just click this button when you're done!";
const SUBMIT_PROMPT: &str = "Are you really ready to submit?";
const AFTER_SUBMIT: &str =
    "To add/edit a new item to any chat, please initiate /additem or /edititem in that chat";

fn at(step: FieldStep) -> ConversationState {
    ConversationState::AddOrEdit(step)
}

/// Starts a fresh add workflow.
pub async fn enter(ctx: &Ctx<'_>, _target: ChatId) -> Result<Turn, ListbotError> {
    Ok(Turn::new(Commit::to(at(FieldStep::SetName))).clear_menu(NAME_PROMPT, ctx.event.message()))
}

/// Back to the action menu, applying `commit` on the way.
pub fn ready(commit: Commit, reply_to: Option<MessageRef>) -> Turn {
    Turn::new(ready_commit(commit)).menu(NEXT_ACTION, field_menu_rows(), reply_to)
}

fn ready_commit(commit: Commit) -> Commit {
    Commit {
        state: Some(at(FieldStep::ReadyForNextAction)),
        ..commit
    }
}

pub async fn handle(ctx: &Ctx<'_>, step: FieldStep) -> Result<Turn, ListbotError> {
    match step {
        FieldStep::SetName => set_name(ctx).await,
        FieldStep::ReadyForNextAction => next_action(ctx).await,
        FieldStep::SetAddress => set_text_field(ctx, TextField::Address).await,
        FieldStep::SetNotes => set_text_field(ctx, TextField::Notes).await,
        FieldStep::SetUrl => set_text_field(ctx, TextField::Url).await,
        FieldStep::SetImages => add_image(ctx).await,
        FieldStep::SetTags => add_tag(ctx).await,
        FieldStep::RemoveTags => remove_tag(ctx).await,
        FieldStep::ConfirmSubmit => confirm_submit(ctx).await,
    }
}

async fn set_name(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let Input::Text(text) = ctx.input() else {
        return Err(ListbotError::validation("Name should be a text"));
    };
    let name = validate_label(text, "Name", ctx.config.max_label_len)?;

    let target = target_chat(ctx).await?;
    let exists = ctx.store.get_item(target, &name).await?.is_some();

    let commit = ready_commit(Commit::default().with_temp_item(Slot::Set(Item::named(&name))));
    let mut turn = Turn::new(commit).text("You may start adding the details for the item");
    if exists {
        turn = turn.text(format!(
            "An item named \"{name}\" already exists, submitting will replace it"
        ));
    }
    Ok(turn.menu(NEXT_ACTION, field_menu_rows(), ctx.event.message()))
}

async fn next_action(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let action = match ctx.input() {
        Input::Text(token) | Input::Button(token) => token.parse::<MenuAction>().ok(),
        Input::Photo(_) => None,
    };
    let Some(action) = action else {
        return Ok(Turn::refuse().menu(PICK_FROM_MENU, field_menu_rows(), ctx.event.message()));
    };
    debug!(action = %action, "menu action selected");

    let here = ctx.event.message();
    let turn = match action {
        MenuAction::SetAddress => {
            Turn::new(Commit::to(at(FieldStep::SetAddress))).text("Send an address to be added")
        }
        MenuAction::SetNotes => Turn::new(Commit::to(at(FieldStep::SetNotes)))
            .text("Give some additional details as notes"),
        MenuAction::SetUrl => {
            Turn::new(Commit::to(at(FieldStep::SetUrl))).text("Send a URL to be added")
        }
        MenuAction::AddImage => {
            Turn::new(Commit::to(at(FieldStep::SetImages))).text("Send an image to be added")
        }
        MenuAction::AddTag => {
            let item = ctx.temp_item().await?;
            let (text, rows) = add_tag_options(ctx, &item).await?;
            let commit = Commit::to(at(FieldStep::SetTags)).with_message_target(message_slot(here));
            Turn::new(commit).text(ADD_TAG_PROMPT).options(text, rows)
        }
        MenuAction::RemoveTag => {
            let item = ctx.temp_item().await?;
            let commit =
                Commit::to(at(FieldStep::RemoveTags)).with_message_target(message_slot(here));
            Turn::new(commit)
                .text(REMOVE_TAG_PROMPT)
                .options(EXISTING_TAGS, tag_rows(&item.tags))
        }
        MenuAction::Preview => {
            let item = ctx.temp_item().await?;
            Turn::reply()
                .text(item_details(&item))
                .extend(photos(&item))
                .menu("Select your next action", field_menu_rows(), here)
        }
        MenuAction::Submit => {
            let commit =
                Commit::to(at(FieldStep::ConfirmSubmit)).with_message_target(message_slot(here));
            Turn::new(commit).options(SUBMIT_PROMPT, yes_no_rows())
        }
        MenuAction::Cancel => {
            let commit = Commit::to(ConversationState::Idle)
                .with_temp_item(Slot::Clear)
                .with_chat_target(Slot::Clear)
                .with_message_target(Slot::Clear);
            Turn::new(commit).clear_menu("Process cancelled, nothing was saved", here)
        }
    };
    Ok(turn)
}

#[derive(Debug, Clone, Copy)]
enum TextField {
    Address,
    Notes,
    Url,
}

impl TextField {
    fn label(self) -> &'static str {
        match self {
            TextField::Address => "Address",
            TextField::Notes => "Notes",
            TextField::Url => "URL",
        }
    }

    fn slot(self, item: &mut Item) -> &mut Option<String> {
        match self {
            TextField::Address => &mut item.address,
            TextField::Notes => &mut item.notes,
            TextField::Url => &mut item.url,
        }
    }
}

async fn set_text_field(ctx: &Ctx<'_>, field: TextField) -> Result<Turn, ListbotError> {
    let Input::Text(text) = ctx.input() else {
        return Err(ListbotError::validation(format!(
            "{} should be a text",
            field.label()
        )));
    };
    if text.is_empty() {
        return Err(ListbotError::validation(format!(
            "{} cannot be empty",
            field.label()
        )));
    }

    let mut item = ctx.temp_item().await?;
    *field.slot(&mut item) = Some(text.to_string());

    let commit = ready_commit(Commit::default().with_temp_item(Slot::Set(item)));
    Ok(Turn::new(commit)
        .text(format!("{} set to: {text}", field.label()))
        .menu(NEXT_ACTION, field_menu_rows(), ctx.event.message()))
}

async fn add_image(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let Input::Photo(image) = ctx.input() else {
        return Err(ListbotError::validation(
            "Error occurred. Did you send an image? Try it again",
        ));
    };

    let mut item = ctx.temp_item().await?;
    let text = if item.add_image(image.clone()) {
        "Image added"
    } else {
        "This image is already added"
    };
    let commit = ready_commit(Commit::default().with_temp_item(Slot::Set(item)));
    Ok(Turn::new(commit)
        .text(text)
        .menu(NEXT_ACTION, field_menu_rows(), ctx.event.message()))
}

async fn add_tag(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let Some(choice) = ctx.choice() else {
        return Err(ListbotError::validation("Tag should be a text"));
    };
    if is_done(choice) {
        let reply_to = ctx.reply_target().await?;
        return Ok(ready(
            Commit::default().with_message_target(Slot::Clear),
            reply_to,
        ));
    }

    let tag = validate_label(choice, "Tag", ctx.config.max_label_len)?;
    let mut item = ctx.temp_item().await?;
    if !item.tags.add(tag.clone()) {
        return Ok(Turn::reply().text(format!("Tag \"{tag}\" is already added")));
    }

    let (text, rows) = add_tag_options(ctx, &item).await?;
    let commit = Commit::default().with_temp_item(Slot::Set(item));
    Ok(Turn::new(commit)
        .text(format!("Tag \"{tag}\" added"))
        .options(text, rows))
}

async fn remove_tag(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let mut item = ctx.temp_item().await?;
    let Input::Button(payload) = ctx.input() else {
        return Ok(Turn::refuse()
            .text(PICK_FROM_OPTIONS)
            .options(EXISTING_TAGS, tag_rows(&item.tags)));
    };
    if is_done(payload) {
        let reply_to = ctx.reply_target().await?;
        return Ok(ready(
            Commit::default().with_message_target(Slot::Clear),
            reply_to,
        ));
    }
    if !item.tags.remove(payload) {
        // Stale button: the tag set stays as it is.
        return Ok(Turn::rejected(&ListbotError::not_found("tag", payload))
            .options(EXISTING_TAGS, tag_rows(&item.tags)));
    }

    let rows = tag_rows(&item.tags);
    let commit = Commit::default().with_temp_item(Slot::Set(item));
    Ok(Turn::new(commit)
        .text(format!("Tag \"{payload}\" removed"))
        .options(EXISTING_TAGS, rows))
}

async fn confirm_submit(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    match ctx.input() {
        Input::Button(YES) => {
            let item = ctx.temp_item().await?;
            let target = target_chat(ctx).await?;
            let confirmation = format!("{} has been added/edited!", item.name);
            let commit = Commit::to(ConversationState::Idle)
                .with_temp_item(Slot::Clear)
                .with_chat_target(Slot::Clear)
                .with_message_target(Slot::Clear)
                .with_upsert(target, item);
            let mut turn = Turn::new(commit).clear_menu(confirmation, None);
            if target != ctx.key.chat {
                turn = turn.text(AFTER_SUBMIT);
            }
            Ok(turn)
        }
        Input::Button(NO) => {
            let reply_to = ctx.reply_target().await?;
            Ok(ready(Commit::default(), reply_to))
        }
        _ => Ok(Turn::refuse()
            .text(PICK_FROM_OPTIONS)
            .options(SUBMIT_PROMPT, yes_no_rows())),
    }
}

/// The chat vocabulary the staged item does not carry yet.
async fn add_tag_options(
    ctx: &Ctx<'_>,
    item: &Item,
) -> Result<(&'static str, Vec<Vec<InlineOption>>), ListbotError> {
    let target = target_chat(ctx).await?;
    let available: TagSet = ctx.store.list_tags(target).await?.difference(&item.tags);
    if available.is_empty() {
        Ok((NO_TAGS, vec![vec![InlineOption::same(DONE)]]))
    } else {
        Ok((EXISTING_TAGS, tag_rows(&available)))
    }
}

fn message_slot(message: Option<MessageRef>) -> Slot<MessageRef> {
    message.map_or(Slot::Keep, Slot::Set)
}

/// One photo effect per staged image.
pub fn photos(item: &Item) -> Vec<Effect> {
    item.images.iter().cloned().map(Effect::Photo).collect()
}
