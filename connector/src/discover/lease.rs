/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::cache::now_millis;
use super::storage::{KeyValueStore, StoreError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Persisted marker of a running discover fetch and how far it got.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FetchStatus {
    pub in_progress: bool,
    pub start_time: i64,
    pub services_hash: String,
    pub current_industry_index: usize,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub last_update: Option<i64>,
}

impl FetchStatus {
    pub fn started(owner: &str, services_hash: &str, now: i64) -> Self {
        Self {
            in_progress: true,
            start_time: now,
            services_hash: services_hash.to_string(),
            current_industry_index: 0,
            owner: Some(owner.to_string()),
            last_update: Some(now),
        }
    }

    pub fn last_seen(&self) -> i64 {
        self.last_update.unwrap_or(self.start_time).max(self.start_time)
    }

    /// An in-progress marker nobody renewed within `timeout` was abandoned.
    pub fn is_stale(&self, timeout: Duration, now: i64) -> bool {
        self.in_progress && now - self.last_seen() > timeout.num_milliseconds()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    /// No usable marker existed; progress starts at the first industry.
    Fresh(FetchStatus),
    /// A live marker for the same services was taken over.
    Resumed(FetchStatus),
}

impl Acquired {
    pub fn status(&self) -> &FetchStatus {
        match self {
            Acquired::Fresh(status) | Acquired::Resumed(status) => status,
        }
    }

    pub fn into_status(self) -> FetchStatus {
        match self {
            Acquired::Fresh(status) | Acquired::Resumed(status) => status,
        }
    }
}

/// Owner plus expiry lock over one storage key.
pub struct LeaseStore<S> {
    store: S,
    key: &'static str,
    timeout: Duration,
}

impl<S: KeyValueStore> LeaseStore<S> {
    pub fn new(store: S, key: &'static str, timeout: Duration) -> Self {
        Self {
            store,
            key,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn current(&self) -> Option<FetchStatus> {
        let raw = self.store.get(self.key)?;

        match serde_json::from_str(&raw) {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(key = self.key, "dropping unreadable fetch status: {}", e);
                self.store.remove(self.key);
                None
            }
        }
    }

    /// Takes the lease for `services_hash`.
    ///
    /// A live marker for the same hash is adopted together with its progress,
    /// whoever wrote it. Stale markers and markers for another services list
    /// are replaced by a fresh one. A failed write leaves the lease held in
    /// memory only.
    pub fn acquire(&self, owner: &str, services_hash: &str) -> Acquired {
        let now = now_millis();

        let acquired = match self.current() {
            Some(status)
                if status.in_progress
                    && !status.is_stale(self.timeout, now)
                    && status.services_hash == services_hash =>
            {
                if status.owner.as_deref().is_some_and(|prev| prev != owner) {
                    info!(
                        previous_owner = status.owner.as_deref().unwrap_or_default(),
                        index = status.current_industry_index,
                        "taking over in-progress discover fetch"
                    );
                }

                Acquired::Resumed(FetchStatus {
                    owner: Some(owner.to_string()),
                    last_update: Some(now),
                    ..status
                })
            }
            Some(status) => {
                if status.is_stale(self.timeout, now) {
                    info!(
                        index = status.current_industry_index,
                        "discarding abandoned discover fetch"
                    );
                }

                Acquired::Fresh(FetchStatus::started(owner, services_hash, now))
            }
            None => Acquired::Fresh(FetchStatus::started(owner, services_hash, now)),
        };

        if let Err(e) = self.write(acquired.status()) {
            warn!(key = self.key, "failed to record fetch status: {}", e);
        }

        acquired
    }

    /// Records progress and extends the lease.
    pub fn renew(&self, status: &mut FetchStatus, index: usize) -> Result<(), StoreError> {
        status.current_industry_index = index;
        status.last_update = Some(now_millis());
        self.write(status)
    }

    pub fn release(&self) {
        self.store.remove(self.key);
    }

    fn write(&self, status: &FetchStatus) -> Result<(), StoreError> {
        self.store.set(self.key, &serde_json::to_string(status)?)
    }
}
