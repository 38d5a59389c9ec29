// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Global command vocabulary.
//!
//! Global commands override whatever workflow the conversation is in. They
//! are only recognized in text events.

use strum::{Display, EnumIter, EnumString};

/// A top-level operation. The camelCase form doubles as the deep-link start
/// parameter used to resume the operation in a private chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    AddItem,
    Query,
    DeleteItem,
    EditItem,
}

impl Operation {
    /// The slash command that starts this operation.
    pub fn command(&self) -> &'static str {
        match self {
            Operation::AddItem => "/additem",
            Operation::Query => "/query",
            Operation::DeleteItem => "/deleteitem",
            Operation::EditItem => "/edititem",
        }
    }

    /// Whether starting the operation requires existing items in the target chat.
    pub fn needs_items(&self) -> bool {
        !matches!(self, Operation::AddItem)
    }
}

/// Commands that short-circuit any in-progress workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalCommand {
    /// `/start` without a recognized parameter.
    Start,
    /// `/start <operation>` arriving through a private deep link.
    Resume(Operation),
    Reset,
    Help,
    Begin(Operation),
}

/// Parses the global command in `text`, if any.
///
/// The command word is matched case-insensitively and a trailing
/// `@botname` is ignored.
pub fn parse_global(text: &str) -> Option<GlobalCommand> {
    let (word, arg) = split_command(text)?;
    let command = match word.to_ascii_lowercase().as_str() {
        "/start" => match arg.and_then(|a| a.parse::<Operation>().ok()) {
            Some(op) => GlobalCommand::Resume(op),
            None => GlobalCommand::Start,
        },
        "/reset" => GlobalCommand::Reset,
        "/help" => GlobalCommand::Help,
        "/additem" => GlobalCommand::Begin(Operation::AddItem),
        "/query" => GlobalCommand::Begin(Operation::Query),
        "/deleteitem" => GlobalCommand::Begin(Operation::DeleteItem),
        "/edititem" => GlobalCommand::Begin(Operation::EditItem),
        _ => return None,
    };
    Some(command)
}

/// Returns `true` for text using the reserved command prefix.
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Splits `/word@bot arg` into (`/word`, `Some("arg")`).
fn split_command(text: &str) -> Option<(&str, Option<&str>)> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }
    let (head, arg) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, Some(rest.trim()).filter(|r| !r.is_empty())),
        None => (text, None),
    };
    let word = head.split_once('@').map_or(head, |(word, _)| word);
    Some((word, arg))
}
