// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing texts, menu tokens, and option layouts.
//!
//! Every option grid built here derives its order from sorted inputs, so the
//! same data always yields the same layout.

use listbot_core::{InlineOption, Item, TagSet};
use strum::{Display, EnumIter, EnumString};

pub const APOLOGY: &str = "Sorry, an error occurred!";
pub const NEXT_ACTION: &str = "What do you want to do next?";
pub const PICK_FROM_MENU: &str = "Please select a response from the provided options";
pub const PICK_FROM_OPTIONS: &str = "Please select from the above options";
pub const STALE_MENU: &str = "That menu is no longer active.";
pub const UNKNOWN_COMMAND: &str = "Unknown command, please use /help for commands";
pub const RESET_DONE: &str = "Everything has been reset!";
pub const NO_ITEMS: &str = "There are no items saved for this chat yet. Use /additem to add one!";
pub const NO_MATCHES: &str = "No matching items found";

/// Completion token ending a repeating add/remove loop.
pub const DONE: &str = "/done";
pub const YES: &str = "yes";
pub const NO: &str = "no";

pub const START_TEXT: &str = "Hi! I keep a shared list of items (places, restaurants, anything) for each chat.\n\n\
/additem - add a new item\n\
/edititem - edit an existing item\n\
/deleteitem - delete an item\n\
/query - look items up by name or tag\n\
/reset - abandon whatever you are doing\n\
/help - show this message";

pub const HELP_TEXT: &str = "Commands:\n\
/additem - add a new item\n\
/edititem - edit an existing item\n\
/deleteitem - delete an item\n\
/query - look items up by name or tag\n\
/reset - abandon whatever you are doing\n\
/help - show this message\n\n\
Started in a group, a command continues in a private chat with me and the result is saved to the group.";

/// Tokens of the add/edit action menu. A token arrives as text (reply menu)
/// or as a button payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum MenuAction {
    #[strum(serialize = "/setAddress")]
    SetAddress,
    #[strum(serialize = "/setNotes")]
    SetNotes,
    #[strum(serialize = "/setURL")]
    SetUrl,
    #[strum(serialize = "/addImage")]
    AddImage,
    #[strum(serialize = "/addTag")]
    AddTag,
    #[strum(serialize = "/removeTag")]
    RemoveTag,
    #[strum(serialize = "/preview")]
    Preview,
    #[strum(serialize = "/submit")]
    Submit,
    #[strum(serialize = "/cancel")]
    Cancel,
}

/// Rows of the persistent add/edit action menu.
pub fn field_menu_rows() -> Vec<Vec<String>> {
    use MenuAction::*;
    [
        [SetAddress, SetUrl, SetNotes],
        [AddImage, AddTag, RemoveTag],
        [Cancel, Preview, Submit],
    ]
    .iter()
    .map(|row| row.iter().map(ToString::to_string).collect())
    .collect()
}

/// Whether `input` is the completion token, with or without its slash.
pub fn is_done(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case(DONE) || input.eq_ignore_ascii_case("done")
}

/// One option per row, payload equal to label.
pub fn single_column<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<Vec<InlineOption>> {
    labels
        .into_iter()
        .map(|label| vec![InlineOption::same(label)])
        .collect()
}

/// One option per tag, followed by the completion token.
pub fn tag_rows(tags: &TagSet) -> Vec<Vec<InlineOption>> {
    let mut rows = single_column(tags.iter());
    rows.push(vec![InlineOption::same(DONE)]);
    rows
}

/// A yes/no pair on one row.
pub fn yes_no_rows() -> Vec<Vec<InlineOption>> {
    vec![vec![InlineOption::same(YES), InlineOption::same(NO)]]
}

/// Human-readable summary of an item. Empty fields are omitted.
pub fn item_details(item: &Item) -> String {
    let mut lines = Vec::new();
    if !item.name.is_empty() {
        lines.push(format!("Name: {}", item.name));
    }
    if let Some(address) = item.address.as_deref().filter(|a| !a.is_empty()) {
        lines.push(format!("Address: {address}"));
    }
    if let Some(url) = item.url.as_deref().filter(|u| !u.is_empty()) {
        lines.push(format!("URL: {url}"));
    }
    if !item.images.is_empty() {
        lines.push(format!("Images: {}", item.images.len()));
    }
    if !item.tags.is_empty() {
        lines.push(format!("Tags: {}", item.tags.joined(", ")));
    }
    if let Some(notes) = item.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("Notes: {notes}"));
    }
    lines.join("\n")
}
