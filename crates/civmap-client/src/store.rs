//! Location Data Store: the single owner of the in-memory location list.
//!
//! Operations never fail past this boundary. Errors land in the `error`
//! field of the state (or in the search-fallback flags for `search`), and the
//! list is either replaced, appended to, or left as it was.
//!
//! Operations are serialized per store: `fetch`, `refresh`, `search`, and the
//! `filter_by_*` helpers wait their turn, while `load_more` is skipped when
//! anything else is in flight. After [`LocationStore::dispose`], results of
//! in-flight requests are discarded (only `loading` is cleared) and new
//! operations do nothing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use civmap_core::{Location, LocationId};

use crate::api::{LocationBackend, LocationPage};
use crate::envelope::Pagination;
use crate::error::ClientError;
use crate::query::LocationQuery;

/// Observable store state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub locations: Vec<Location>,
    pub pagination: Pagination,
    pub loading: bool,
    pub error: Option<String>,
    /// Backend search was unavailable; filter `locations` client-side.
    pub search_fallback: bool,
    pub search_error: Option<String>,
}

impl StoreSnapshot {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pagination.has_more()
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Relay`] carrying the stored message when the
    /// last operation failed.
    pub fn check(&self) -> Result<(), ClientError> {
        match &self.error {
            Some(message) => Err(ClientError::Relay {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: StoreSnapshot,
    /// Filters of the last replacing operation, reused by `load_more`.
    last_query: Option<LocationQuery>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Replace the list; on failure clear it and set `error`.
    Replace,
    /// Replace the list; on failure keep it and flag search fallback.
    Search,
}

pub struct LocationStore<B> {
    backend: B,
    page_size: u32,
    state: Mutex<StoreState>,
    op_lock: tokio::sync::Mutex<()>,
    disposed: AtomicBool,
}

impl<B: LocationBackend> LocationStore<B> {
    #[must_use]
    pub fn new(backend: B, page_size: u32) -> Self {
        Self {
            backend,
            page_size: page_size.max(1),
            state: Mutex::new(StoreState::default()),
            op_lock: tokio::sync::Mutex::new(()),
            disposed: AtomicBool::new(false),
        }
    }

    /// A first-page query at the store's page size.
    #[must_use]
    pub fn query(&self) -> LocationQuery {
        LocationQuery::new(self.page_size)
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state().snapshot.clone()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.state().snapshot.has_more()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().snapshot.loading
    }

    /// Marks the store torn down.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        tracing::debug!("location store disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Fetches the page described by `query` and replaces the list with it.
    /// On failure the list is cleared and `error` is set; pagination is kept.
    pub async fn fetch(&self, query: LocationQuery) {
        let _guard = self.op_lock.lock().await;
        self.run_replace(query, Mode::Replace).await;
    }

    /// Re-fetches from page 1, discarding the current list.
    pub async fn refresh(&self, query: LocationQuery) {
        self.fetch(query.page(1)).await;
    }

    /// Asks the backend to search for `term`. On failure the current list is
    /// left untouched and `search_fallback` is raised so the filter engine
    /// can search it client-side.
    pub async fn search(&self, term: &str, query: LocationQuery) {
        let _guard = self.op_lock.lock().await;
        self.run_replace(query.search(term).page(1), Mode::Search).await;
    }

    pub async fn filter_by_type(&self, kind: &str, query: LocationQuery) {
        self.fetch(query.kind(kind)).await;
    }

    pub async fn filter_by_year(&self, year: i32, query: LocationQuery) {
        self.fetch(query.year(year)).await;
    }

    /// Appends the next page using the filters of the last fetch. Does
    /// nothing when another operation is running, when the last page has
    /// been reached, or before the first fetch. Records whose `id` is
    /// already listed are dropped.
    pub async fn load_more(&self) {
        let Ok(_guard) = self.op_lock.try_lock() else {
            tracing::debug!("load more skipped: another operation is in flight");
            return;
        };
        if self.is_disposed() {
            return;
        }

        let query = {
            let state = self.state();
            let pagination = state.snapshot.pagination;
            match &state.last_query {
                Some(last) if pagination.has_more() => last.clone().page(pagination.page + 1),
                _ => {
                    tracing::debug!(
                        page = pagination.page,
                        total_pages = pagination.total_pages,
                        "load more skipped: no further pages"
                    );
                    return;
                }
            }
        };

        self.begin();
        let result = self.backend.fetch_page(&query).await;
        let mut state = self.state();
        let snapshot = &mut state.snapshot;
        snapshot.loading = false;
        if self.is_disposed() {
            tracing::debug!("discarding load-more result for disposed store");
            return;
        }
        match result {
            Ok(page) => {
                let before = snapshot.locations.len();
                let received = page.locations.len();
                append_unique(&mut snapshot.locations, page.locations);
                let appended = snapshot.locations.len() - before;
                if appended < received {
                    tracing::warn!(
                        received,
                        appended,
                        "dropped duplicate locations from overlapping page"
                    );
                }
                snapshot.pagination = page.pagination;
                tracing::debug!(page = query.page, appended, "loaded more locations");
            }
            Err(e) => {
                tracing::warn!(page = query.page, error = %e, "load more failed");
                snapshot.error = Some(e.to_string());
            }
        }
    }

    async fn run_replace(&self, query: LocationQuery, mode: Mode) {
        if self.is_disposed() {
            return;
        }

        self.begin();
        let result = self.backend.fetch_page(&query).await;
        let mut state = self.state();
        state.snapshot.loading = false;
        if self.is_disposed() {
            tracing::debug!("discarding fetch result for disposed store");
            return;
        }
        match (result, mode) {
            (Ok(page), _) => {
                tracing::info!(
                    page = page.pagination.page,
                    total = page.pagination.total,
                    count = page.locations.len(),
                    search_fallback = page.search_fallback,
                    "locations fetched"
                );
                apply_page(&mut state.snapshot, page);
                state.last_query = Some(query);
            }
            (Err(e), Mode::Replace) => {
                tracing::warn!(error = %e, "fetching locations failed");
                let snapshot = &mut state.snapshot;
                snapshot.locations.clear();
                snapshot.error = Some(e.to_string());
                snapshot.search_fallback = false;
                snapshot.search_error = None;
            }
            (Err(e), Mode::Search) => {
                tracing::info!(error = %e, "backend search failed, falling back to client-side filtering");
                let snapshot = &mut state.snapshot;
                snapshot.search_fallback = true;
                snapshot.search_error = Some(e.to_string());
            }
        }
    }

    fn begin(&self) {
        let mut state = self.state();
        state.snapshot.loading = true;
        state.snapshot.error = None;
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply_page(snapshot: &mut StoreSnapshot, page: LocationPage) {
    snapshot.locations.clear();
    append_unique(&mut snapshot.locations, page.locations);
    snapshot.pagination = page.pagination;
    snapshot.search_fallback = page.search_fallback;
    snapshot.search_error = page.search_error;
}

/// Appends `incoming` in order, skipping ids already present (first
/// occurrence wins).
fn append_unique(list: &mut Vec<Location>, incoming: Vec<Location>) {
    let mut seen: HashSet<LocationId> = list.iter().map(|l| l.id.clone()).collect();
    list.extend(incoming.into_iter().filter(|l| seen.insert(l.id.clone())));
}

impl<B> std::fmt::Debug for LocationStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationStore")
            .field("page_size", &self.page_size)
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
