// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for listbot.
//!
//! One inbound [`InputEvent`](listbot_core::InputEvent) is one turn: the
//! engine serializes turns per conversation identity, lets global commands
//! override any in-progress workflow, routes everything else to the handler
//! owning the stored state's category, persists the resulting
//! [`Commit`](listbot_core::Commit) atomically, and finally delivers the
//! turn's effects through the transport.

pub mod command;
pub mod engine;
pub mod locks;
pub mod recording;
pub mod render;
pub mod router;
pub mod turn;
pub mod workflow;

pub use command::{GlobalCommand, Operation};
pub use engine::{Engine, TurnOutcome};
pub use locks::KeyedLocks;
pub use turn::{Effect, Turn};
