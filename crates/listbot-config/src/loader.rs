// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./listbot.toml` > `~/.config/listbot/listbot.toml` >
//! `/etc/listbot/listbot.toml` with environment variable overrides via `LISTBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ListbotConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/listbot/listbot.toml";
pub(crate) const LOCAL_CONFIG: &str = "listbot.toml";

/// Top-level sections, used to map `LISTBOT_<SECTION>_<KEY>` onto `section.key`.
const SECTIONS: &[&str] = &["bot", "telegram", "storage", "gateway", "engine"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("listbot/listbot.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/listbot/listbot.toml` (system-wide)
/// 3. `~/.config/listbot/listbot.toml` (user XDG config)
/// 4. `./listbot.toml` (local directory)
/// 5. `LISTBOT_*` environment variables
pub fn load_config() -> Result<ListbotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ListbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ListbotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ListbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ListbotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ListbotConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `LISTBOT_TELEGRAM_BOT_TOKEN` maps to `telegram.bot_token`, never
/// `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("LISTBOT_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
