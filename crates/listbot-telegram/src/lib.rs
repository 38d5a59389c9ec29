// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for listbot.
//!
//! Implements [`Transport`] for the Telegram Bot API via teloxide, decodes
//! inbound updates into [`InputEvent`](listbot_core::InputEvent)s, and runs
//! long polling for local use.

pub mod handler;
pub mod poller;

use async_trait::async_trait;
use listbot_config::model::TelegramConfig;
use listbot_core::{
    AdapterType, ChatId, HealthStatus, ImageRef, InlineOption, ListbotError, MessageRef,
    PluginAdapter, Transport,
};
use reqwest::Url;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    KeyboardButton, KeyboardMarkup, KeyboardRemove, MessageId, ReplyParameters,
};
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub use handler::{decode_update, normalize_command};
pub use poller::spawn_polling;

/// Telegram transport implementing [`Transport`].
pub struct TelegramTransport {
    bot: Bot,
    /// Username used for deep links; resolved through `getMe` when not configured.
    username: OnceCell<String>,
}

impl TelegramTransport {
    /// Creates a new Telegram transport.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, ListbotError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ListbotError::Config("telegram.bot_token is required for the Telegram transport".into())
        })?;

        if token.is_empty() {
            return Err(ListbotError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let username = OnceCell::new();
        if let Some(name) = config.bot_username.as_deref().filter(|n| !n.is_empty()) {
            let _ = username.set(name.trim_start_matches('@').to_string());
        }

        Ok(Self {
            bot: Bot::new(token),
            username,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Registers `url` as the bot's webhook, with Telegram echoing `secret`
    /// in the `X-Telegram-Bot-Api-Secret-Token` header of every delivery.
    pub async fn register_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), ListbotError> {
        let url = Url::parse(url)
            .map_err(|e| ListbotError::Config(format!("invalid telegram.webhook_url: {e}")))?;
        let mut request = self.bot.set_webhook(url.clone());
        if let Some(secret) = secret {
            request = request.secret_token(secret.to_string());
        }
        request
            .await
            .map_err(|e| transport_error("register webhook", e))?;
        info!(url = %url, "telegram webhook registered");
        Ok(())
    }

    async fn username(&self) -> Result<&str, ListbotError> {
        let name = self
            .username
            .get_or_try_init(|| async {
                let me = self
                    .bot
                    .get_me()
                    .await
                    .map_err(|e| transport_error("resolve bot username", e))?;
                me.user.username.clone().ok_or_else(|| ListbotError::Transport {
                    message: "bot account has no username".into(),
                    source: None,
                })
            })
            .await?;
        Ok(name.as_str())
    }
}

/// Builds the `t.me` link that opens a private chat with the bot and sends
/// `/start <start_param>`.
pub fn deep_link(username: &str, start_param: &str) -> Result<Url, ListbotError> {
    let base = format!("https://t.me/{}", username.trim_start_matches('@'));
    Url::parse_with_params(&base, &[("start", start_param)])
        .map_err(|e| ListbotError::Internal(format!("invalid deep link: {e}")))
}

/// Persistent reply keyboard; each button sends its label as text.
pub fn reply_keyboard(rows: &[Vec<String>]) -> KeyboardMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> = rows
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect())
        .collect();
    KeyboardMarkup::new(keyboard)
        .persistent()
        .resize_keyboard()
        .selective()
}

/// Inline keyboard whose buttons come back as callback queries.
pub fn inline_keyboard(rows: &[Vec<InlineOption>]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|option| {
                    InlineKeyboardButton::callback(option.label.clone(), option.payload.clone())
                })
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(keyboard)
}

fn transport_error(action: &str, e: RequestError) -> ListbotError {
    ListbotError::Transport {
        message: format!("failed to {action}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn recipient(chat: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat.0)
}

fn reply_parameters(message: MessageRef) -> ReplyParameters {
    ReplyParameters::new(MessageId(message.0))
}

#[async_trait]
impl PluginAdapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, ListbotError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ListbotError> {
        debug!("Telegram transport shutting down");
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), ListbotError> {
        self.bot
            .send_message(recipient(chat), text)
            .await
            .map_err(|e| transport_error("send message", e))?;
        Ok(())
    }

    async fn send_photo(&self, chat: ChatId, image: &ImageRef) -> Result<(), ListbotError> {
        self.bot
            .send_photo(recipient(chat), InputFile::file_id(FileId(image.0.clone())))
            .await
            .map_err(|e| transport_error("send photo", e))?;
        Ok(())
    }

    async fn show_button_menu(
        &self,
        chat: ChatId,
        text: &str,
        rows: &[Vec<String>],
        reply_to: Option<MessageRef>,
    ) -> Result<(), ListbotError> {
        let mut request = self
            .bot
            .send_message(recipient(chat), text)
            .reply_markup(reply_keyboard(rows));
        if let Some(message) = reply_to {
            request = request.reply_parameters(reply_parameters(message));
        }
        request
            .await
            .map_err(|e| transport_error("show menu", e))?;
        Ok(())
    }

    async fn show_inline_options(
        &self,
        chat: ChatId,
        text: &str,
        rows: &[Vec<InlineOption>],
    ) -> Result<(), ListbotError> {
        self.bot
            .send_message(recipient(chat), text)
            .reply_markup(inline_keyboard(rows))
            .await
            .map_err(|e| transport_error("show options", e))?;
        Ok(())
    }

    async fn clear_menu(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageRef>,
    ) -> Result<(), ListbotError> {
        let mut request = self
            .bot
            .send_message(recipient(chat), text)
            .reply_markup(KeyboardRemove::new().selective());
        if let Some(message) = reply_to {
            request = request.reply_parameters(reply_parameters(message));
        }
        request
            .await
            .map_err(|e| transport_error("clear menu", e))?;
        Ok(())
    }

    async fn send_private_redirect(
        &self,
        chat: ChatId,
        text: &str,
        label: &str,
        start_param: &str,
    ) -> Result<(), ListbotError> {
        let url = deep_link(self.username().await?, start_param)?;
        let keyboard =
            InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(label.to_string(), url)]]);
        self.bot
            .send_message(recipient(chat), text)
            .reply_markup(keyboard)
            .await
            .map_err(|e| transport_error("send redirect", e))?;
        Ok(())
    }

    async fn acknowledge(&self, selection_id: &str) -> Result<(), ListbotError> {
        self.bot
            .answer_callback_query(CallbackQueryId(selection_id.to_string()))
            .await
            .map_err(|e| transport_error("answer callback query", e))?;
        Ok(())
    }
}
