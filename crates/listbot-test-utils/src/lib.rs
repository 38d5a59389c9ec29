// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for listbot integration tests.
//!
//! Provides mock adapters and a harness for fast, deterministic tests
//! without a Telegram account or a database on disk.
//!
//! # Components
//!
//! - [`MockTransport`] - Transport that captures every delivery
//! - [`MemoryStore`] - In-memory conversation store with failure injection
//! - [`TestHarness`] - Engine wired to the mocks, with turn helpers

pub mod harness;
pub mod memory_store;
pub mod mock_transport;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_store::MemoryStore;
pub use mock_transport::{Delivery, MockTransport};
