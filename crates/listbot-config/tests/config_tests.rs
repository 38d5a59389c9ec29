// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the listbot configuration system.

use listbot_config::diagnostic::ConfigError;
use listbot_config::model::ListbotConfig;
use listbot_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_listbot_config() {
    let toml = r#"
[bot]
name = "places"
log_level = "debug"

[telegram]
bot_token = "123:ABC"
bot_username = "places_bot"
webhook_url = "https://bot.example.com/tg"
webhook_secret = "abc-123"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[gateway]
bind_address = "0.0.0.0"
port = 8443
webhook_path = "/tg"

[engine]
default_result_count = 5
max_result_count = 20
max_label_len = 48
help_text = "Ask the admins."
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.name, "places");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.bot_username.as_deref(), Some("places_bot"));
    assert_eq!(
        config.telegram.webhook_url.as_deref(),
        Some("https://bot.example.com/tg")
    );
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.bind_address, "0.0.0.0");
    assert_eq!(config.gateway.port, 8443);
    assert_eq!(config.gateway.webhook_path, "/tg");
    assert_eq!(config.engine.default_result_count, 5);
    assert_eq!(config.engine.max_result_count, 20);
    assert_eq!(config.engine.max_label_len, 48);
    assert_eq!(config.engine.help_text.as_deref(), Some("Ask the admins."));
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.bot.name, "listbot");
    assert_eq!(config.bot.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.webhook_url.is_none());
    assert!(config.storage.database_path.ends_with("listbot.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.gateway.bind_address, "127.0.0.1");
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.webhook_path, "/webhook");
    assert_eq!(config.engine.default_result_count, 3);
    assert_eq!(config.engine.max_result_count, 10);
    assert!(config.engine.help_text.is_none());
}

#[test]
fn unknown_field_in_bot_produces_error() {
    let toml = r#"
[bot]
naem = "test"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("naem"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = r#"
[telegram]
bot_tken = "abc"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "bot_tken");
            assert_eq!(suggestion.as_deref(), Some("bot_token"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[anthropic]
api_key = "x"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn wrong_type_produces_invalid_type_diagnostic() {
    let toml = r#"
[gateway]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string port");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key == "gateway.port")),
        "got: {errors:?}"
    );
}

#[test]
fn validation_runs_after_successful_parse() {
    let toml = r#"
[engine]
default_result_count = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero result count is invalid");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("default_result_count"))
    ));
}

/// A figment merge on top of the file behaves like an env override.
#[test]
fn later_layer_overrides_file_value() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[telegram]
bot_token = "from-toml"
"#;

    let config: ListbotConfig = Figment::new()
        .merge(Serialized::defaults(ListbotConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("telegram.bot_token", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
}

#[test]
fn redacted_config_serializes_without_secrets() {
    let toml = r#"
[telegram]
bot_token = "123:SECRET"
webhook_secret = "topsecret"
"#;
    let config = load_config_from_str(toml).expect("valid TOML");
    let printed = toml::to_string_pretty(&config.redacted()).expect("serializable");
    assert!(!printed.contains("SECRET"));
    assert!(!printed.contains("topsecret"));
    assert!(printed.contains("[REDACTED]"));
}
