// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge for listbot configuration.
//!
//! Turns figment extraction failures into miette diagnostics that point at
//! the offending line of `listbot.toml`. Unknown keys get three kinds of
//! hints: a Jaro-Winkler "did you mean?" within the section, the section a
//! misplaced key actually belongs to (`max_result_count` written under
//! `[telegram]`), and the `LISTBOT_*` variable it came from when the key was
//! set through the environment rather than a file.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Every key listbot understands, by section.
const SECTION_KEYS: &[(&str, &[&str])] = &[
    ("bot", &["name", "log_level"]),
    (
        "telegram",
        &["bot_token", "bot_username", "webhook_url", "webhook_secret"],
    ),
    ("storage", &["database_path", "wal_mode"]),
    ("gateway", &["bind_address", "port", "webhook_path"]),
    (
        "engine",
        &[
            "default_result_count",
            "max_result_count",
            "max_label_len",
            "help_text",
        ],
    ),
];

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(listbot::config::unknown_key),
        help(
            "{}",
            format_unknown_key_help(
                key,
                suggestion.as_deref(),
                home_section.as_deref(),
                env_var.as_deref(),
                valid_keys
            )
        )
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Closest valid key of the same section, if any.
        suggestion: Option<String>,
        /// The section this key is valid in, when it was written elsewhere.
        home_section: Option<String>,
        /// The `LISTBOT_*` variable that introduced the key.
        env_var: Option<String>,
        /// Comma-separated valid keys of the section.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(listbot::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path of the key, e.g. `gateway.port`.
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(listbot::config::missing_key),
        help("add `{key} = <value>` to your listbot.toml")
    )]
    MissingKey { key: String },

    /// A semantic check on a deserialized value failed.
    #[error("validation error: {message}")]
    #[diagnostic(code(listbot::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(listbot::config::other))]
    Other(String),
}

fn format_unknown_key_help(
    key: &str,
    suggestion: Option<&str>,
    home_section: Option<&str>,
    env_var: Option<&str>,
    valid_keys: &str,
) -> String {
    let mut help = match (home_section, suggestion) {
        (Some(section), _) => format!("`{key}` belongs in the [{section}] section"),
        (None, Some(s)) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        (None, None) => format!("valid keys: {valid_keys}"),
    };
    if let Some(var) = env_var {
        help.push_str(&format!(" (set by environment variable {var})"));
    }
    help
}

/// Returns the section that defines `key`, if exactly one does.
///
/// Keys shared by several sections (none today) return `None`.
pub fn home_section(key: &str) -> Option<&'static str> {
    let mut homes = SECTION_KEYS
        .iter()
        .filter(|(_, keys)| keys.contains(&key))
        .map(|(section, _)| *section);
    let home = homes.next()?;
    homes.next().is_none().then_some(home)
}

/// The `LISTBOT_*` variable that maps onto `path.field`.
pub fn env_var_name(path: &[String], field: &str) -> String {
    let mut name = String::from("LISTBOT");
    for part in path.iter().map(String::as_str).chain(std::iter::once(field)) {
        name.push('_');
        name.push_str(&part.to_ascii_uppercase());
    }
    name
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A figment error may carry several errors; each becomes one diagnostic.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => unknown_key(&error, field, expected, toml_sources),
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => {
                let (span, src) = match error.path.split_last() {
                    Some((field, section)) => {
                        find_source_span(&error, section, field, toml_sources)
                    }
                    None => (None, None),
                };
                ConfigError::InvalidType {
                    key: error.path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span,
                    src,
                }
            }
            _ => ConfigError::Other(format!("{error}")),
        })
        .collect()
}

fn unknown_key(
    error: &figment::error::Error,
    field: &str,
    expected: &[&str],
    toml_sources: &[(String, String)],
) -> ConfigError {
    let current = error.path.first().map(String::as_str);
    let home_section = home_section(field)
        .filter(|home| Some(*home) != current)
        .map(str::to_string);
    let env_var = from_env(error).then(|| env_var_name(&error.path, field));
    let (span, src) = if env_var.is_some() {
        (None, None)
    } else {
        find_source_span(error, &error.path, field, toml_sources)
    };

    ConfigError::UnknownKey {
        key: field.to_string(),
        suggestion: suggest_key(field, expected),
        home_section,
        env_var,
        valid_keys: expected.join(", "),
        span,
        src,
    }
}

fn from_env(error: &figment::error::Error) -> bool {
    error
        .metadata
        .as_ref()
        .is_some_and(|m| m.name.contains("environment variable"))
}

/// Locates `section.field` in the TOML file the error came from.
fn find_source_span(
    error: &figment::error::Error,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let source_path = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings have no file metadata; fall back to the only source.
    let source = match source_path {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    if let Some((path, content)) = source
        && let Some(offset) = find_key_offset(content, section, field)
    {
        let span = SourceSpan::new(offset.into(), field.len());
        let named = NamedSource::new(path, content.clone());
        return (Some(span), Some(named));
    }

    (None, None)
}

/// Find the byte offset of a key in TOML content, relative to a section path.
///
/// For `path = ["engine"]` and `field = "max_results"`, finds the `[engine]`
/// header then searches for `max_results` after it. Top-level fields are
/// searched from the start.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let search_start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header).map(|pos| pos + header.len())?
        }
    };

    let remaining = &content[search_start..];
    let mut byte_offset = 0;
    for line in remaining.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') && path.first().is_some() {
            break;
        }
        if let Some(after) = trimmed.strip_prefix(field)
            && (after.starts_with(' ') || after.starts_with('=') || after.starts_with('\t'))
        {
            let field_start_in_line = line.len() - trimmed.len();
            return Some(search_start + byte_offset + field_start_in_line);
        }
        byte_offset += line.len();
    }

    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
