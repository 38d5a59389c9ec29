// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the conversation tables and the item repository.
//!
//! Each module pairs synchronous helpers over a `rusqlite::Connection`
//! (reused inside the commit transaction) with async wrappers over
//! [`Database`](crate::Database).

pub mod commit;
pub mod items;
pub mod staging;
pub mod states;
pub mod targets;
