/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::storage::{KeyValueStore, StoreError};
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A stored value plus the time it was written (epoch milliseconds).
///
/// The value's fields sit next to `timestamp` in the stored JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    #[serde(flatten)]
    pub value: T,
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn age_millis(&self, now: i64) -> i64 {
        now - self.timestamp
    }

    pub fn is_fresh(&self, ttl: Duration, now: i64) -> bool {
        self.age_millis(now) <= ttl.num_milliseconds()
    }
}

/// Typed, time limited view onto one key of a [`KeyValueStore`].
pub struct TtlCache<S> {
    store: S,
    key: &'static str,
    ttl: Duration,
}

impl<S: KeyValueStore> TtlCache<S> {
    pub fn new(store: S, key: &'static str, ttl: Duration) -> Self {
        Self { store, key, ttl }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The stored entry regardless of age. Unreadable entries are dropped.
    pub fn entry<T: DeserializeOwned>(&self) -> Option<CacheEntry<T>> {
        let raw = self.store.get(self.key)?;

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = self.key, "dropping unreadable cache entry: {}", e);
                self.store.remove(self.key);
                None
            }
        }
    }

    pub fn get<T: DeserializeOwned>(&self) -> Option<T> {
        self.entry::<T>()
            .filter(|entry| entry.is_fresh(self.ttl, now_millis()))
            .map(|entry| entry.value)
    }

    pub fn put<T: Serialize>(&self, value: T) -> Result<(), StoreError> {
        let entry = CacheEntry {
            value,
            timestamp: now_millis(),
        };

        self.store.set(self.key, &serde_json::to_string(&entry)?)
    }

    pub fn clear(&self) {
        self.store.remove(self.key);
    }
}
