// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for listbot, a chat-driven record manager.
//!
//! This crate provides the conversation model (states, items, tags, the
//! per-turn write-set), the error type, and the adapter traits that
//! transports and stores implement.

pub mod commit;
pub mod error;
pub mod item;
pub mod state;
pub mod tags;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use commit::{Commit, Slot};
pub use error::ListbotError;
pub use item::{Item, QueryDraft, QueryFilter};
pub use state::{ConversationState, DeleteStep, EditStep, FieldStep, QueryStep, StateCategory};
pub use tags::TagSet;
pub use types::{
    AdapterType, ChatId, ConversationKey, HealthStatus, ImageRef, InlineOption, InputEvent,
    MessageRef, UserId,
};

pub use traits::{ConversationStore, PluginAdapter, Transport};
