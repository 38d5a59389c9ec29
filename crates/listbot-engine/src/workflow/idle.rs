// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input arriving while no workflow is active.

use listbot_core::ListbotError;

use super::{Ctx, Input};
use crate::command::is_command;
use crate::render::{STALE_MENU, UNKNOWN_COMMAND};
use crate::turn::Turn;

pub const IDLE_HINT: &str = "Use /additem to add an item, or /help for all commands";

pub async fn handle(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let turn = match ctx.input() {
        Input::Button(_) => Turn::reply().text(STALE_MENU),
        // Group chatter is not addressed to the bot.
        _ if !ctx.key.is_private() => Turn::reply(),
        Input::Text(text) if is_command(text) => Turn::reply().text(UNKNOWN_COMMAND),
        Input::Text(_) | Input::Photo(_) => Turn::reply().text(IDLE_HINT),
    };
    Ok(turn)
}
