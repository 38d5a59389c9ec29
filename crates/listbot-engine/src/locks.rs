// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation turn serialization.
//!
//! Two turns for the same [`ConversationKey`] (a duplicate webhook delivery,
//! a double-tapped button) run one after the other; turns for different keys
//! never wait on each other. Entries are dropped as soon as no turn holds or
//! awaits them, so the table only ever contains in-flight keys.

use std::sync::Arc;

use dashmap::DashMap;
use listbot_core::ConversationKey;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct KeyedLocks {
    inner: DashMap<ConversationKey, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn holds `key`.
    pub async fn lock(&self, key: ConversationKey) -> KeyGuard<'_> {
        let mutex = self.inner.entry(key).or_default().clone();
        let guard = mutex.lock_owned().await;
        KeyGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Holds a key's lock; releasing it prunes the entry when nobody else waits.
pub struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: ConversationKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The table's own reference is the only one left when idle.
        self.locks
            .inner
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
