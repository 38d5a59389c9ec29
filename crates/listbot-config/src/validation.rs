// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid IP addresses, non-empty paths, and consistent limits.

use crate::diagnostic::ConfigError;
use crate::model::ListbotConfig;

/// Shortest label limit that still fits the fixed menu tokens.
const MIN_LABEL_LEN: usize = 8;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ListbotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let addr = config.gateway.bind_address.trim();
    if addr.is_empty() {
        fail("gateway.bind_address must not be empty".to_string());
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.bind_address `{addr}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.gateway.port == 0 {
        fail("gateway.port must not be 0".to_string());
    }

    if !config.gateway.webhook_path.starts_with('/') {
        fail(format!(
            "gateway.webhook_path must start with `/`, got `{}`",
            config.gateway.webhook_path
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if let Some(url) = &config.telegram.webhook_url
        && !url.starts_with("https://")
    {
        fail(format!("telegram.webhook_url must be an https URL, got `{url}`"));
    }

    // Telegram accepts 1-256 characters from A-Z, a-z, 0-9, `_` and `-`.
    if let Some(secret) = &config.telegram.webhook_secret {
        let valid = !secret.is_empty()
            && secret.len() <= 256
            && secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            fail(
                "telegram.webhook_secret must be 1-256 characters of A-Z, a-z, 0-9, `_` or `-`"
                    .to_string(),
            );
        }
    }

    if let Some(username) = &config.telegram.bot_username
        && username.starts_with('@')
    {
        fail("telegram.bot_username must not include the leading `@`".to_string());
    }

    let engine = &config.engine;
    if engine.default_result_count == 0 {
        fail("engine.default_result_count must be at least 1".to_string());
    }
    if engine.default_result_count > engine.max_result_count {
        fail(format!(
            "engine.default_result_count ({}) must not exceed engine.max_result_count ({})",
            engine.default_result_count, engine.max_result_count
        ));
    }
    if engine.max_label_len < MIN_LABEL_LEN {
        fail(format!(
            "engine.max_label_len must be at least {MIN_LABEL_LEN}, got {}",
            engine.max_label_len
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ListbotConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ListbotConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn plain_http_webhook_url_fails_validation() {
        let mut config = ListbotConfig::default();
        config.telegram.webhook_url = Some("http://example.com/webhook".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "webhook_url"));
    }

    #[test]
    fn webhook_secret_with_spaces_fails_validation() {
        let mut config = ListbotConfig::default();
        config.telegram.webhook_secret = Some("not allowed".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "webhook_secret"));
    }

    #[test]
    fn inverted_result_counts_fail_validation() {
        let mut config = ListbotConfig::default();
        config.engine.default_result_count = 20;
        config.engine.max_result_count = 5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "must not exceed"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ListbotConfig::default();
        config.gateway.port = 0;
        config.gateway.webhook_path = "webhook".into();
        config.engine.max_label_len = 2;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = ListbotConfig::default();
        config.gateway.bind_address = "0.0.0.0".to_string();
        config.storage.database_path = "/tmp/test.db".to_string();
        config.telegram.webhook_url = Some("https://bot.example.com/webhook".into());
        config.telegram.webhook_secret = Some("s3cret_token-1".into());
        assert!(validate_config(&config).is_ok());
    }
}
