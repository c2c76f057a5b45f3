use std::collections::VecDeque;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use tokio::sync::Notify;

use super::*;

/// Backend that replays scripted responses and records every query.
#[derive(Default)]
struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<LocationPage, ClientError>>>,
    queries: Mutex<Vec<LocationQuery>>,
}

impl ScriptedBackend {
    fn with(responses: Vec<Result<LocationPage, ClientError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<LocationQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl LocationBackend for ScriptedBackend {
    async fn fetch_page(&self, query: &LocationQuery) -> Result<LocationPage, ClientError> {
        self.queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(relay_error("no scripted response")))
    }
}

/// Backend that blocks inside `fetch_page` until released.
struct GatedBackend {
    started: Notify,
    release: Notify,
    calls: AtomicU32,
}

impl GatedBackend {
    fn new() -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            calls: AtomicU32::new(0),
        }
    }
}

impl LocationBackend for GatedBackend {
    async fn fetch_page(&self, _query: &LocationQuery) -> Result<LocationPage, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(page(&[1, 2], 1, 3))
    }
}

fn relay_error(message: &str) -> ClientError {
    ClientError::Relay {
        message: message.to_owned(),
    }
}

fn page(ids: &[i64], page_no: u32, total_pages: u32) -> LocationPage {
    LocationPage {
        locations: ids
            .iter()
            .map(|&id| Location::new(id, format!("place {id}")))
            .collect(),
        pagination: Pagination {
            page: page_no,
            limit: 2,
            total: u64::from(total_pages) * 2,
            total_pages,
        },
        search_fallback: false,
        search_error: None,
        message: None,
    }
}

fn ids(store: &LocationStore<impl LocationBackend>) -> Vec<String> {
    store
        .snapshot()
        .locations
        .iter()
        .map(|l| l.id.to_string())
        .collect()
}

#[tokio::test]
async fn fetch_replaces_list_and_pagination() {
    let store = LocationStore::new(
        ScriptedBackend::with(vec![Ok(page(&[1, 2], 1, 3)), Ok(page(&[9], 1, 1))]),
        2,
    );

    store.fetch(store.query()).await;
    assert_eq!(ids(&store), vec!["1", "2"]);
    assert!(store.has_more());

    store.fetch(store.query()).await;
    let snapshot = store.snapshot();
    assert_eq!(ids(&store), vec!["9"]);
    assert_eq!(snapshot.pagination.total_pages, 1);
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn fetch_failure_clears_list_and_keeps_pagination() {
    let store = LocationStore::new(
        ScriptedBackend::with(vec![Ok(page(&[1, 2], 1, 3)), Err(relay_error("boom"))]),
        2,
    );
    store.fetch(store.query()).await;
    store.fetch(store.query()).await;

    let snapshot = store.snapshot();
    assert!(snapshot.locations.is_empty());
    assert_eq!(snapshot.error.as_deref(), Some("location API error: boom"));
    assert_eq!(snapshot.pagination.total_pages, 3);
    assert!(!snapshot.loading);
    assert!(snapshot.check().is_err());
}

#[tokio::test]
async fn load_more_appends_next_page_with_last_filters() {
    let backend = ScriptedBackend::with(vec![Ok(page(&[1, 2], 1, 2)), Ok(page(&[3, 4], 2, 2))]);
    let store = LocationStore::new(backend, 2);

    store.filter_by_type("riskZone", store.query()).await;
    store.load_more().await;

    assert_eq!(ids(&store), vec!["1", "2", "3", "4"]);
    assert!(!store.has_more());

    let queries = store.backend.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].page, 2);
    assert_eq!(queries[1].kind.as_deref(), Some("riskZone"));
}

#[tokio::test]
async fn load_more_drops_duplicate_ids() {
    let store = LocationStore::new(
        ScriptedBackend::with(vec![Ok(page(&[1, 2], 1, 2)), Ok(page(&[2, 3, 3], 2, 2))]),
        2,
    );
    store.fetch(store.query()).await;
    store.load_more().await;
    assert_eq!(ids(&store), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn load_more_at_last_page_is_a_no_op() {
    let store = LocationStore::new(ScriptedBackend::with(vec![Ok(page(&[1], 1, 1))]), 2);
    store.fetch(store.query()).await;
    let before = store.snapshot();

    store.load_more().await;

    assert_eq!(store.snapshot(), before);
    assert_eq!(store.backend.queries().len(), 1);
}

#[tokio::test]
async fn load_more_before_any_fetch_does_nothing() {
    let store = LocationStore::new(ScriptedBackend::default(), 2);
    store.load_more().await;
    assert!(store.backend.queries().is_empty());
}

#[tokio::test]
async fn load_more_failure_keeps_list() {
    let store = LocationStore::new(
        ScriptedBackend::with(vec![Ok(page(&[1, 2], 1, 3)), Err(relay_error("timeout"))]),
        2,
    );
    store.fetch(store.query()).await;
    store.load_more().await;

    let snapshot = store.snapshot();
    assert_eq!(ids(&store), vec!["1", "2"]);
    assert!(snapshot.error.is_some());
    assert_eq!(snapshot.pagination.page, 1);
}

#[tokio::test]
async fn refresh_requests_page_one() {
    let store = LocationStore::new(
        ScriptedBackend::with(vec![Ok(page(&[1], 1, 1))]),
        2,
    );
    store.refresh(store.query().page(4)).await;
    assert_eq!(store.backend.queries()[0].page, 1);
}

#[tokio::test]
async fn search_failure_keeps_list_and_signals_fallback() {
    let store = LocationStore::new(
        ScriptedBackend::with(vec![Ok(page(&[1, 2], 1, 1)), Err(relay_error("search down"))]),
        2,
    );
    store.fetch(store.query()).await;
    store.search("market", store.query()).await;

    let snapshot = store.snapshot();
    assert_eq!(ids(&store), vec!["1", "2"]);
    assert!(snapshot.search_fallback);
    assert!(snapshot.search_error.is_some());
    assert!(snapshot.error.is_none());
    assert_eq!(
        store.backend.queries()[1].search.as_deref(),
        Some("market")
    );
}

#[tokio::test]
async fn search_success_replaces_list_and_copies_backend_fallback() {
    let mut fallback = page(&[5], 1, 1);
    fallback.search_fallback = true;
    fallback.search_error = Some("no index".to_owned());
    let store = LocationStore::new(
        ScriptedBackend::with(vec![Ok(page(&[1, 2], 1, 1)), Ok(fallback)]),
        2,
    );
    store.fetch(store.query()).await;
    store.search("x", store.query()).await;

    let snapshot = store.snapshot();
    assert_eq!(ids(&store), vec!["5"]);
    assert!(snapshot.search_fallback);
    assert_eq!(snapshot.search_error.as_deref(), Some("no index"));
}

#[tokio::test]
async fn filter_by_year_sends_year() {
    let store = LocationStore::new(ScriptedBackend::with(vec![Ok(page(&[1], 1, 1))]), 2);
    store.filter_by_year(2023, store.query()).await;
    assert_eq!(store.backend.queries()[0].year, Some(2023));
}

#[tokio::test]
async fn load_more_is_skipped_while_a_fetch_is_in_flight() {
    let store = Arc::new(LocationStore::new(GatedBackend::new(), 2));

    let fetching = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.fetch(store.query()).await })
    };
    store.backend.started.notified().await;
    assert!(store.is_loading());

    store.load_more().await;
    assert_eq!(store.backend.calls.load(Ordering::SeqCst), 1);

    store.backend.release.notify_one();
    fetching.await.unwrap();
    assert_eq!(ids(&store), vec!["1", "2"]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn results_after_dispose_are_discarded() {
    let store = Arc::new(LocationStore::new(GatedBackend::new(), 2));

    let fetching = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.fetch(store.query()).await })
    };
    store.backend.started.notified().await;
    store.dispose();
    store.backend.release.notify_one();
    fetching.await.unwrap();

    let snapshot = store.snapshot();
    assert!(snapshot.locations.is_empty());
    assert!(!snapshot.loading, "settled request clears loading even when discarded");

    store.fetch(store.query()).await;
    assert_eq!(store.backend.calls.load(Ordering::SeqCst), 1, "disposed store issues no requests");
}

#[tokio::test]
async fn load_more_settling_after_dispose_clears_loading() {
    let store = Arc::new(LocationStore::new(GatedBackend::new(), 2));

    let fetching = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.fetch(store.query()).await })
    };
    store.backend.started.notified().await;
    store.backend.release.notify_one();
    fetching.await.unwrap();
    assert!(store.has_more());

    let loading_more = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.load_more().await })
    };
    store.backend.started.notified().await;
    assert!(store.is_loading());
    store.dispose();
    store.backend.release.notify_one();
    loading_more.await.unwrap();

    assert!(!store.is_loading());
    assert_eq!(ids(&store), vec!["1", "2"], "discarded page is not appended");
    assert_eq!(store.backend.calls.load(Ordering::SeqCst), 2);
}
