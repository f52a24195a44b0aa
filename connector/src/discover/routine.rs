/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::*;
use crate::ConnectorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, instrument, warn};

pub type CompaniesByIndustry = BTreeMap<String, Vec<CompanyDto>>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServicesBlob {
    pub data: Vec<IndustryServices>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompaniesBlob {
    pub data: CompaniesByIndustry,
    pub hash: String,
    pub completed: bool,
}

/// What an overview page shows while the routine runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverState {
    pub services: Vec<IndustryServices>,
    pub industries_with_companies: CompaniesByIndustry,
    pub loading_companies: BTreeMap<String, bool>,
}

impl DiscoverState {
    pub fn is_loading(&self) -> bool {
        self.loading_companies.values().any(|loading| *loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoverOutcome {
    /// A completed cache matched the services; nothing was fetched.
    Cached,
    Completed { fetched: usize, resumed_from: usize },
    /// Stopped before `next_index`; progress stays stored for the next run.
    Cancelled { next_index: usize },
}

#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("a discover fetch is already running")]
    AlreadyRunning,
    #[error("failed to load services: {0}")]
    Services(#[source] ConnectorError),
    #[error("discover task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

struct FetchingGuard<'a>(&'a AtomicBool);

impl Drop for FetchingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DiscoverRoutine<B, S: ?Sized> {
    backend: B,
    services_cache: TtlCache<Arc<S>>,
    companies_cache: TtlCache<Arc<S>>,
    lease: LeaseStore<Arc<S>>,
    owner: String,
    fetching: AtomicBool,
    state: watch::Sender<DiscoverState>,
}

impl<B, S> DiscoverRoutine<B, S>
where
    B: DiscoverBackend,
    S: KeyValueStore + ?Sized,
{
    pub fn new(backend: B, store: Arc<S>) -> Self {
        let (state, _) = watch::channel(DiscoverState::default());

        Self {
            backend,
            services_cache: TtlCache::new(Arc::clone(&store), SERVICES_CACHE_KEY, cache_ttl()),
            companies_cache: TtlCache::new(Arc::clone(&store), COMPANIES_CACHE_KEY, cache_ttl()),
            lease: LeaseStore::new(store, FETCH_STATUS_KEY, fetch_status_timeout()),
            owner: uuid::Uuid::new_v4().to_string(),
            fetching: AtomicBool::new(false),
            state,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn subscribe(&self) -> watch::Receiver<DiscoverState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DiscoverState {
        self.state.borrow().clone()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    /// Forgets every cached result and any recorded progress.
    pub fn clear(&self) {
        blocking_io(|| {
            self.services_cache.clear();
            self.companies_cache.clear();
            self.lease.release();
        });
    }

    async fn load_services(&self) -> Result<Vec<IndustryServices>, ConnectorError> {
        if let Some(blob) = blocking_io(|| self.services_cache.get::<ServicesBlob>()) {
            debug!(industries = blob.data.len(), "services served from cache");
            return Ok(blob.data);
        }

        let services = self.backend.services().await?;

        let blob = ServicesBlob {
            data: services.clone(),
        };

        if let Err(e) = blocking_io(|| self.services_cache.put(blob)) {
            warn!("failed to cache services: {}", e);
        }

        Ok(services)
    }

    fn cached_companies(&self, hash: &str) -> Option<CompaniesBlob> {
        blocking_io(|| self.companies_cache.get::<CompaniesBlob>()).filter(|blob| blob.hash == hash)
    }

    fn store_companies(&self, data: &CompaniesByIndustry, hash: &str, completed: bool) {
        let blob = CompaniesBlob {
            data: data.clone(),
            hash: hash.to_string(),
            completed,
        };

        if let Err(e) = blocking_io(|| self.companies_cache.put(blob)) {
            warn!(completed, "failed to cache companies: {}", e);
        }
    }

    fn publish(&self, update: impl FnOnce(&mut DiscoverState)) {
        self.state.send_modify(update);
    }

    /// Fills the companies per industry, from cache when possible.
    ///
    /// Industries are fetched one at a time and every result is written
    /// through before the next starts. `cancel` is honoured between and
    /// during requests; a cancelled run keeps its lease so the next call
    /// resumes where this one stopped.
    #[instrument(skip_all, fields(owner = %self.owner))]
    pub async fn run(&self, cancel: &CancellationToken) -> Result<DiscoverOutcome, DiscoverError> {
        if self.fetching.swap(true, Ordering::AcqRel) {
            return Err(DiscoverError::AlreadyRunning);
        }

        let _fetching = FetchingGuard(&self.fetching);

        let services = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(DiscoverOutcome::Cancelled { next_index: 0 }),
            services = self.load_services() => services.map_err(DiscoverError::Services)?,
        };

        let hash = services_hash(&services);

        if let Some(blob) = self.cached_companies(&hash).filter(|blob| blob.completed) {
            info!(industries = blob.data.len(), "discover served from cache");

            self.publish(|state| {
                state.loading_companies = services
                    .iter()
                    .map(|industry| (industry.industry.clone(), false))
                    .collect();
                state.services = services;
                state.industries_with_companies = blob.data;
            });

            return Ok(DiscoverOutcome::Cached);
        }

        let (mut status, mut data) = match blocking_io(|| self.lease.acquire(&self.owner, &hash)) {
            Acquired::Resumed(status) => {
                let data = self
                    .cached_companies(&hash)
                    .map(|blob| blob.data)
                    .unwrap_or_default();

                info!(
                    index = status.current_industry_index,
                    cached = data.len(),
                    "resuming discover fetch"
                );
                (status, data)
            }
            Acquired::Fresh(status) => {
                info!(industries = services.len(), "starting discover fetch");
                (status, CompaniesByIndustry::new())
            }
        };

        let recorded = status.current_industry_index.min(services.len());
        let resumed_from = services
            .iter()
            .take(recorded)
            .position(|industry| !data.contains_key(&industry.industry))
            .unwrap_or(recorded);

        if resumed_from < recorded {
            warn!(recorded, resumed_from, "cached companies behind recorded progress");
        }

        self.publish(|state| {
            state.services = services.clone();
            state.industries_with_companies = data.clone();
            state.loading_companies = services
                .iter()
                .enumerate()
                .map(|(index, industry)| (industry.industry.clone(), index >= resumed_from))
                .collect();
        });

        for (index, industry) in services.iter().enumerate().skip(resumed_from) {
            if cancel.is_cancelled() {
                info!(next_index = index, "discover fetch cancelled");
                return Ok(DiscoverOutcome::Cancelled { next_index: index });
            }

            if let Err(e) = blocking_io(|| self.lease.renew(&mut status, index)) {
                warn!(index, "failed to record fetch progress: {}", e);
            }

            let service_ids = industry.service_ids();

            let companies = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(next_index = index, "discover fetch cancelled");
                    return Ok(DiscoverOutcome::Cancelled { next_index: index });
                }
                result = self.backend.top_companies(&service_ids, TOP_COMPANIES_PER_INDUSTRY) => {
                    match result {
                        Ok(mut companies) => {
                            companies.truncate(TOP_COMPANIES_PER_INDUSTRY);
                            companies
                        }
                        Err(e) => {
                            warn!(industry = %industry.industry, "failed to fetch top companies: {}", e);
                            Vec::new()
                        }
                    }
                }
            };

            debug!(industry = %industry.industry, count = companies.len(), "industry fetched");
            data.insert(industry.industry.clone(), companies.clone());

            self.publish(|state| {
                state
                    .industries_with_companies
                    .insert(industry.industry.clone(), companies);
                state
                    .loading_companies
                    .insert(industry.industry.clone(), false);
            });

            self.store_companies(&data, &hash, false);
        }

        self.store_companies(&data, &hash, true);
        blocking_io(|| self.lease.release());

        info!(industries = data.len(), resumed_from, "discover fetch completed");

        Ok(DiscoverOutcome::Completed {
            fetched: services.len() - resumed_from,
            resumed_from,
        })
    }
}

impl<B, S> DiscoverRoutine<B, S>
where
    B: DiscoverBackend + 'static,
    S: KeyValueStore + ?Sized + 'static,
{
    /// Runs the routine on the runtime for as long as the returned handle
    /// lives.
    pub fn spawn(self: Arc<Self>) -> DiscoverHandle {
        let cancel = CancellationToken::new();
        let state = self.subscribe();
        let token = cancel.clone();

        let task = tokio::spawn(async move { self.run(&token).await });

        DiscoverHandle {
            task,
            state,
            guard: cancel.clone().drop_guard(),
            cancel,
        }
    }
}

/// Owner side of a spawned routine; dropping it cancels the fetch.
pub struct DiscoverHandle {
    task: JoinHandle<Result<DiscoverOutcome, DiscoverError>>,
    state: watch::Receiver<DiscoverState>,
    cancel: CancellationToken,
    guard: DropGuard,
}

impl DiscoverHandle {
    pub fn state(&self) -> watch::Receiver<DiscoverState> {
        self.state.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<DiscoverOutcome, DiscoverError> {
        let DiscoverHandle { task, guard, .. } = self;
        let outcome = task.await?;
        drop(guard);
        outcome
    }
}
