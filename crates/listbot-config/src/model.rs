// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for listbot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level listbot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ListbotConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Webhook HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Conversation engine limits and texts.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ListbotConfig {
    /// A copy safe to print: secrets are replaced by a marker.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |secret: &mut Option<String>| {
            if secret.is_some() {
                *secret = Some(REDACTED.to_string());
            }
        };
        mask(&mut copy.telegram.bot_token);
        mask(&mut copy.telegram.webhook_secret);
        copy
    }
}

const REDACTED: &str = "[REDACTED]";

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs and the health endpoint.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "listbot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `serve` and `poll`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Bot username (without `@`), used to build private deep links and to
    /// strip `@botname` from group commands.
    #[serde(default)]
    pub bot_username: Option<String>,

    /// Public HTTPS URL Telegram should deliver updates to. When unset,
    /// `serve` does not register a webhook.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Shared secret Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable SQLite WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("listbot").join("listbot.db"))
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "listbot.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route Telegram posts updates to.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            webhook_path: default_webhook_path(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

/// Conversation engine limits and texts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of items a browse/tag query returns when the user asks for the default.
    #[serde(default = "default_result_count")]
    pub default_result_count: usize,

    /// Upper bound on the number of items a single query renders.
    #[serde(default = "default_max_result_count")]
    pub max_result_count: usize,

    /// Longest accepted item name or tag, in bytes.
    #[serde(default = "default_max_label_len")]
    pub max_label_len: usize,

    /// Replaces the built-in `/help` text.
    #[serde(default)]
    pub help_text: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_result_count: default_result_count(),
            max_result_count: default_max_result_count(),
            max_label_len: default_max_label_len(),
            help_text: None,
        }
    }
}

fn default_result_count() -> usize {
    3
}

fn default_max_result_count() -> usize {
    10
}

// Telegram caps callback data at 64 bytes.
fn default_max_label_len() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_masks_only_present_secrets() {
        let mut config = ListbotConfig::default();
        config.telegram.bot_token = Some("123:ABC".into());
        config.telegram.bot_username = Some("listbot".into());

        let redacted = config.redacted();
        assert_eq!(redacted.telegram.bot_token.as_deref(), Some(REDACTED));
        assert!(redacted.telegram.webhook_secret.is_none());
        assert_eq!(redacted.telegram.bot_username.as_deref(), Some("listbot"));
    }

    #[test]
    fn engine_defaults_are_consistent() {
        let engine = EngineConfig::default();
        assert!(engine.default_result_count <= engine.max_result_count);
        assert_eq!(engine.max_label_len, 64);
    }
}
