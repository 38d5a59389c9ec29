// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound capability set of a chat client (Telegram, test doubles, ...).

use async_trait::async_trait;

use crate::error::ListbotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, ImageRef, InlineOption, MessageRef};

/// Delivers messages, photos, and menus to a chat.
///
/// The engine treats every call as fire-and-forget: a failure is logged and
/// never rolls back the turn that produced it.
#[async_trait]
pub trait Transport: PluginAdapter {
    /// Sends plain text.
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), ListbotError>;

    /// Re-sends a previously received photo.
    async fn send_photo(&self, chat: ChatId, image: &ImageRef) -> Result<(), ListbotError>;

    /// Shows a persistent reply-style menu whose buttons send their label as text.
    async fn show_button_menu(
        &self,
        chat: ChatId,
        text: &str,
        rows: &[Vec<String>],
        reply_to: Option<MessageRef>,
    ) -> Result<(), ListbotError>;

    /// Shows one-shot options that come back as button selections.
    async fn show_inline_options(
        &self,
        chat: ChatId,
        text: &str,
        rows: &[Vec<InlineOption>],
    ) -> Result<(), ListbotError>;

    /// Sends text and removes any reply-style menu.
    async fn clear_menu(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageRef>,
    ) -> Result<(), ListbotError>;

    /// Sends a button that opens a private conversation with the bot,
    /// starting it with `start_param`.
    async fn send_private_redirect(
        &self,
        chat: ChatId,
        text: &str,
        label: &str,
        start_param: &str,
    ) -> Result<(), ListbotError>;

    /// Acknowledges a button selection so the client stops waiting on it.
    async fn acknowledge(&self, _selection_id: &str) -> Result<(), ListbotError> {
        Ok(())
    }
}
