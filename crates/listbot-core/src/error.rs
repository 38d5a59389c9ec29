// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for listbot.

use thiserror::Error;

/// The primary error type used across adapter traits, workflows and the engine.
///
/// `Validation` and `NotFound` are user-facing: their message is shown to the
/// user as a corrective prompt and the turn commits nothing. Every other
/// variant aborts the turn with a generic apology.
#[derive(Debug, Error)]
pub enum ListbotError {
    /// Configuration errors (invalid TOML, missing token, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence failures (database unreachable, query failure, bad payload).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Message delivery failures reported by a transport.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The input event does not match what the current state expects.
    #[error("{0}")]
    Validation(String),

    /// A button payload references a tag or item that no longer exists.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: String, name: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ListbotError {
    /// Shorthand for a [`ListbotError::Validation`] carrying a corrective prompt.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a [`ListbotError::NotFound`].
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Returns `true` for errors the user can fix by sending different input.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for ListbotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage {
            source: Box::new(e),
        }
    }
}
