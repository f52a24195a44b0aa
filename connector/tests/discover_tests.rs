/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use common::*;
use connector::companies::IndustryServices;
use connector::discover::*;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn seed_services(store: &Arc<MemoryStore>, services: &[IndustryServices]) {
    TtlCache::new(Arc::clone(store), SERVICES_CACHE_KEY, cache_ttl())
        .put(ServicesBlob {
            data: services.to_vec(),
        })
        .unwrap();
}

fn seed_companies(store: &Arc<MemoryStore>, data: CompaniesByIndustry, hash: &str, completed: bool) {
    TtlCache::new(Arc::clone(store), COMPANIES_CACHE_KEY, cache_ttl())
        .put(CompaniesBlob {
            data,
            hash: hash.to_string(),
            completed,
        })
        .unwrap();
}

fn seed_status(store: &Arc<MemoryStore>, hash: &str, index: usize, last_update: i64) {
    let status = FetchStatus {
        in_progress: true,
        start_time: last_update,
        services_hash: hash.to_string(),
        current_industry_index: index,
        owner: Some("another-tab".to_string()),
        last_update: Some(last_update),
    };

    store
        .set(FETCH_STATUS_KEY, &serde_json::to_string(&status).unwrap())
        .unwrap();
}

fn stored_companies(store: &Arc<MemoryStore>) -> CompaniesBlob {
    TtlCache::new(Arc::clone(store), COMPANIES_CACHE_KEY, cache_ttl())
        .get::<CompaniesBlob>()
        .unwrap()
}

fn partial(industries: &[&str]) -> CompaniesByIndustry {
    industries
        .iter()
        .enumerate()
        .map(|(n, industry)| (industry.to_string(), vec![company(n as i64 + 1)]))
        .collect()
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_full_run_fills_every_industry() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new(industries(3)));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DiscoverOutcome::Completed {
            fetched: 3,
            resumed_from: 0
        }
    );
    assert_eq!(backend.service_calls(), 1);
    assert_eq!(backend.company_calls(), vec![vec![1], vec![2], vec![3]]);

    let state = routine.state();
    assert_eq!(state.industries_with_companies.len(), 3);
    assert!(
        state
            .industries_with_companies
            .values()
            .all(|companies| companies.len() == TOP_COMPANIES_PER_INDUSTRY)
    );
    assert!(!state.is_loading());
    assert!(!routine.is_fetching());

    let blob = stored_companies(&store);
    assert!(blob.completed);
    assert_eq!(blob.hash, services_hash(&industries(3)));
    assert!(store.get(FETCH_STATUS_KEY).is_none());
}

#[tokio::test]
async fn test_completed_cache_skips_network() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(2);
    let data = partial(&["A", "B"]);

    seed_services(&store, &services);
    seed_companies(&store, data.clone(), &services_hash(&services), true);

    let backend = Arc::new(MockBackend::new(services.clone()));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, DiscoverOutcome::Cached);
    assert_eq!(backend.service_calls(), 0);
    assert!(backend.company_calls().is_empty());

    let state = routine.state();
    assert_eq!(state.services, services);
    assert_eq!(state.industries_with_companies, data);
    assert_eq!(state.loading_companies.len(), 2);
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let store = Arc::new(MemoryStore::new());
    let first = Arc::new(MockBackend::new(industries(2)));
    DiscoverRoutine::new(Arc::clone(&first), Arc::clone(&store))
        .run(&CancellationToken::new())
        .await
        .unwrap();

    let second = Arc::new(MockBackend::new(industries(2)));
    let routine = DiscoverRoutine::new(Arc::clone(&second), Arc::clone(&store));

    assert_eq!(
        routine.run(&CancellationToken::new()).await.unwrap(),
        DiscoverOutcome::Cached
    );
    assert_eq!(second.service_calls(), 0);
    assert!(second.company_calls().is_empty());
}

#[tokio::test]
async fn test_changed_services_invalidate_companies() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(2);

    seed_services(&store, &services);
    seed_companies(&store, partial(&["A", "B"]), "A:1", true);

    let backend = Arc::new(MockBackend::new(services));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, DiscoverOutcome::Completed { fetched: 2, .. }));
    assert_eq!(backend.company_calls().len(), 2);
}

#[tokio::test]
async fn test_resumes_from_recorded_industry() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(4);
    let hash = services_hash(&services);

    seed_services(&store, &services);
    seed_companies(&store, partial(&["A", "B"]), &hash, false);
    seed_status(&store, &hash, 2, now());

    let backend = Arc::new(MockBackend::new(services));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DiscoverOutcome::Completed {
            fetched: 2,
            resumed_from: 2
        }
    );
    assert_eq!(backend.company_calls(), vec![vec![3], vec![4]]);

    let state = routine.state();
    assert_eq!(state.industries_with_companies["A"], vec![company(1)]);
    assert_eq!(state.industries_with_companies["B"], vec![company(2)]);
    assert_eq!(state.industries_with_companies["D"].len(), TOP_COMPANIES_PER_INDUSTRY);

    let blob = stored_companies(&store);
    assert!(blob.completed);
    assert_eq!(blob.data.len(), 4);
    assert!(store.get(FETCH_STATUS_KEY).is_none());
}

#[tokio::test]
async fn test_resume_keeps_cached_industries_visible() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(4);
    let hash = services_hash(&services);

    seed_services(&store, &services);
    seed_companies(&store, partial(&["A", "B"]), &hash, false);
    seed_status(&store, &hash, 2, now());

    let backend = Arc::new(MockBackend::new(services).blocking(3));
    let routine = Arc::new(DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store)));

    let handle = Arc::clone(&routine).spawn();
    wait_until(|| backend.company_calls().len() == 1).await;

    let state = handle.state().borrow().clone();
    assert_eq!(state.industries_with_companies["A"], vec![company(1)]);
    assert_eq!(state.industries_with_companies["B"], vec![company(2)]);
    assert!(!state.industries_with_companies.contains_key("C"));
    assert_eq!(state.loading_companies.get("A"), Some(&false));
    assert_eq!(state.loading_companies.get("B"), Some(&false));
    assert_eq!(state.loading_companies.get("C"), Some(&true));
    assert_eq!(state.loading_companies.get("D"), Some(&true));
    assert!(state.is_loading());

    handle.cancel();
    assert_eq!(
        handle.join().await.unwrap(),
        DiscoverOutcome::Cancelled { next_index: 2 }
    );
}

#[tokio::test]
async fn test_resume_without_cached_companies_starts_over() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(4);
    let hash = services_hash(&services);

    seed_services(&store, &services);
    seed_status(&store, &hash, 2, now());

    let backend = Arc::new(MockBackend::new(services));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DiscoverOutcome::Completed {
            fetched: 4,
            resumed_from: 0
        }
    );
    assert_eq!(backend.company_calls(), vec![vec![1], vec![2], vec![3], vec![4]]);

    let blob = stored_companies(&store);
    assert!(blob.completed);
    assert_eq!(blob.data.len(), 4);
}

#[tokio::test]
async fn test_resume_starts_at_first_uncached_industry() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(4);
    let hash = services_hash(&services);

    seed_services(&store, &services);
    seed_companies(&store, partial(&["A"]), &hash, false);
    seed_status(&store, &hash, 3, now());

    let backend = Arc::new(MockBackend::new(services));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DiscoverOutcome::Completed {
            fetched: 3,
            resumed_from: 1
        }
    );
    assert_eq!(backend.company_calls(), vec![vec![2], vec![3], vec![4]]);
    assert_eq!(stored_companies(&store).data.len(), 4);
}

#[tokio::test]
async fn test_expired_completed_cache_is_refetched() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(2);
    let day_and_an_hour_ago = now() - 25 * 60 * 60 * 1000;

    seed_services(&store, &services);

    let expired = CacheEntry {
        value: CompaniesBlob {
            data: partial(&["A", "B"]),
            hash: services_hash(&services),
            completed: true,
        },
        timestamp: day_and_an_hour_ago,
    };
    store
        .set(COMPANIES_CACHE_KEY, &serde_json::to_string(&expired).unwrap())
        .unwrap();

    let backend = Arc::new(MockBackend::new(services));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DiscoverOutcome::Completed {
            fetched: 2,
            resumed_from: 0
        }
    );
    assert_eq!(backend.company_calls(), vec![vec![1], vec![2]]);

    let blob = stored_companies(&store);
    assert!(blob.completed);
    assert_eq!(blob.data["A"].len(), TOP_COMPANIES_PER_INDUSTRY);
}

#[tokio::test]
async fn test_stale_status_restarts_from_first_industry() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(3);
    let hash = services_hash(&services);
    let six_minutes_ago = now() - 6 * 60 * 1000;

    seed_services(&store, &services);
    seed_companies(&store, partial(&["A"]), &hash, false);
    seed_status(&store, &hash, 1, six_minutes_ago);

    let backend = Arc::new(MockBackend::new(services));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DiscoverOutcome::Completed {
            fetched: 3,
            resumed_from: 0
        }
    );
    assert_eq!(backend.company_calls(), vec![vec![1], vec![2], vec![3]]);
}

#[tokio::test]
async fn test_failed_industry_is_recorded_empty() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new(industries(3)).failing(2));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = routine.run(&CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, DiscoverOutcome::Completed { fetched: 3, .. }));

    let state = routine.state();
    assert!(state.industries_with_companies["B"].is_empty());
    assert_eq!(state.industries_with_companies["C"].len(), TOP_COMPANIES_PER_INDUSTRY);
    assert_eq!(state.loading_companies.get("B"), Some(&false));
    assert!(stored_companies(&store).completed);
}

#[tokio::test]
async fn test_concurrent_run_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new(industries(2)).blocking(1));
    let routine = Arc::new(DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store)));

    let handle = Arc::clone(&routine).spawn();
    wait_until(|| backend.company_calls().len() == 1).await;

    assert!(routine.is_fetching());
    assert!(matches!(
        routine.run(&CancellationToken::new()).await,
        Err(DiscoverError::AlreadyRunning)
    ));

    handle.cancel();
    assert_eq!(
        handle.join().await.unwrap(),
        DiscoverOutcome::Cancelled { next_index: 0 }
    );
    assert!(!routine.is_fetching());
}

#[tokio::test]
async fn test_dropped_handle_stops_fetch_and_next_run_resumes() {
    let store = Arc::new(MemoryStore::new());
    let services = industries(4);
    let blocked = Arc::new(MockBackend::new(services.clone()).blocking(3));
    let routine = Arc::new(DiscoverRoutine::new(Arc::clone(&blocked), Arc::clone(&store)));

    let handle = Arc::clone(&routine).spawn();
    let mut state = handle.state();
    wait_until(|| blocked.company_calls().len() == 3).await;

    assert_eq!(state.borrow_and_update().industries_with_companies.len(), 2);

    drop(handle);
    wait_until(|| !routine.is_fetching()).await;

    let partial = stored_companies(&store);
    assert!(!partial.completed);
    assert_eq!(partial.data.len(), 2);

    let backend = Arc::new(MockBackend::new(services));
    let resumed = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    let outcome = resumed.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DiscoverOutcome::Completed {
            fetched: 2,
            resumed_from: 2
        }
    );
    assert_eq!(backend.service_calls(), 0);
    assert_eq!(backend.company_calls(), vec![vec![3], vec![4]]);
    assert_eq!(resumed.state().industries_with_companies.len(), 4);
    assert!(stored_companies(&store).completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_file_store_run_on_multi_thread_runtime() {
    let dir = std::env::temp_dir().join(format!("compedia-discover-{}", uuid::Uuid::new_v4()));
    let store = Arc::new(FileStore::new(dir.join("storage.json")));
    let backend = Arc::new(MockBackend::new(industries(3)));
    let routine = Arc::new(DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store)));

    let ticker = tokio::spawn(async {
        let mut ticks = 0;
        while ticks < 5 {
            tokio::time::sleep(Duration::from_millis(1)).await;
            ticks += 1;
        }
        ticks
    });

    let outcome = Arc::clone(&routine).spawn().join().await.unwrap();

    assert_eq!(
        outcome,
        DiscoverOutcome::Completed {
            fetched: 3,
            resumed_from: 0
        }
    );
    assert_eq!(ticker.await.unwrap(), 5);
    assert!(store.get(FETCH_STATUS_KEY).is_none());

    let cached = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));
    assert_eq!(
        cached.run(&CancellationToken::new()).await.unwrap(),
        DiscoverOutcome::Cached
    );

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_clear_forgets_cached_results() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new(industries(1)));
    let routine = DiscoverRoutine::new(Arc::clone(&backend), Arc::clone(&store));

    routine.run(&CancellationToken::new()).await.unwrap();
    routine.clear();

    assert!(store.keys().is_empty());
    assert!(matches!(
        routine.run(&CancellationToken::new()).await.unwrap(),
        DiscoverOutcome::Completed { .. }
    ));
    assert_eq!(backend.service_calls(), 2);
}
