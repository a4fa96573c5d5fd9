//! `CollectionView`: paginated remote-collection view-model
//!
//! Holds the query and fetch state of one list screen. Every query change
//! or refetch dispatches exactly one fetch tagged with a monotonically
//! increasing sequence number; a response is applied only if its sequence
//! is still the latest issued, so a slow answer to an old query can never
//! overwrite a newer one.
//!
//! State lives in a `tokio::sync::watch` channel. Sequence checks and state
//! writes both happen under the channel's write lock, which makes them
//! atomic with respect to each other.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use shopadmin_api::ListQuery;

use crate::config::ViewOptions;
use crate::error::FetchError;
use crate::fetcher::PageFetcher;
use crate::page::FetchState;
use crate::pagination;

/// Snapshot of a view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    /// Query of the latest dispatched fetch
    pub query: ListQuery,
    pub fetch: FetchState<T>,
    /// Sequence number of the latest dispatched fetch (0 before the first)
    pub seq: u64,
}

impl<T> ViewState<T> {
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.fetch.items()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.fetch.is_loading()
    }

    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        self.fetch.error()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.fetch.total()
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.fetch.total_pages()
    }

    /// One-based range of the displayed items, for "showing a–b of n"
    #[must_use]
    pub fn item_range(&self) -> Option<(u64, u64)> {
        pagination::item_range(self.query.page, self.query.page_size, self.total())
    }

    fn begin_fetch(&mut self) -> (u64, ListQuery) {
        self.seq += 1;
        self.fetch.begin_loading();
        (self.seq, self.query.clone())
    }
}

/// View-model over one paginated resource
pub struct CollectionView<T: Send + 'static> {
    fetcher: Arc<dyn PageFetcher<T>>,
    state: Arc<watch::Sender<ViewState<T>>>,
    /// Latest spawned fetch and its sequence number
    in_flight: Mutex<Option<(u64, JoinHandle<()>)>>,
    options: ViewOptions,
}

impl<T> CollectionView<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a view and dispatch the first fetch
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(fetcher: impl PageFetcher<T> + 'static, query: ListQuery) -> Self {
        Self::with_options(fetcher, query, ViewOptions::default())
    }

    /// Create a view with explicit options and dispatch the first fetch
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_options(
        fetcher: impl PageFetcher<T> + 'static,
        query: ListQuery,
        options: ViewOptions,
    ) -> Self {
        let query = ListQuery {
            page_size: query.page_size.max(1),
            ..query
        };
        let (state, _) = watch::channel(ViewState {
            query,
            fetch: FetchState::Idle,
            seq: 0,
        });
        let view = Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(state),
            in_flight: Mutex::new(None),
            options,
        };
        view.refetch();
        view
    }

    // Observation

    /// Clone of the current state
    #[must_use]
    pub fn state(&self) -> ViewState<T> {
        ViewState::clone(&self.state.borrow())
    }

    /// Displayed items; empty until the first successful fetch
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items().to_vec()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.borrow().loading()
    }

    #[must_use]
    pub fn error(&self) -> Option<FetchError> {
        self.state.borrow().error().cloned()
    }

    /// Total element count reported by the backend, 0 by default
    #[must_use]
    pub fn total(&self) -> u64 {
        self.state.borrow().total()
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.state.borrow().total_pages()
    }

    #[must_use]
    pub fn query(&self) -> ListQuery {
        self.state.borrow().query.clone()
    }

    #[must_use]
    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }

    /// Wait until no fetch is in flight and return the state
    pub async fn settled(&self) -> ViewState<T> {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|state| !state.loading()).await {
            Ok(state) => ViewState::clone(&state),
            Err(_) => self.state(),
        }
    }

    // Query changes

    /// Re-run the current query
    pub fn refetch(&self) {
        let mut request = None;
        self.state.send_modify(|state| {
            request = Some(state.begin_fetch());
        });
        if let Some((seq, query)) = request {
            self.spawn_fetch(seq, query);
        }
    }

    /// Replace the whole query; fetches only if it differs
    pub fn set_query(&self, query: ListQuery) -> bool {
        self.update_query(|current| *current = query)
    }

    /// Change the search text, going back to the first page
    pub fn set_search(&self, search: impl Into<String>) -> bool {
        let search = search.into();
        self.update_query(|query| {
            if query.search != search {
                query.search = search;
                query.page = 0;
            }
        })
    }

    pub fn set_page(&self, page: u64) -> bool {
        self.update_query(|query| query.page = page)
    }

    /// Change the page size, going back to the first page
    pub fn set_page_size(&self, page_size: u64) -> bool {
        let page_size = page_size.max(1);
        self.update_query(|query| {
            if query.page_size != page_size {
                query.page_size = page_size;
                query.page = 0;
            }
        })
    }

    /// Change the sort key, going back to the first page
    pub fn set_sort(&self, sort_by: Option<String>) -> bool {
        self.update_query(|query| {
            if query.sort_by != sort_by {
                query.sort_by = sort_by;
                query.page = 0;
            }
        })
    }

    /// Add or replace a filter, going back to the first page
    pub fn set_filter(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let (key, value) = (key.into(), value.into());
        self.update_query(|query| {
            if query.filters.get(&key) != Some(&value) {
                query.filters.insert(key, value);
                query.page = 0;
            }
        })
    }

    /// Drop a filter, going back to the first page
    pub fn remove_filter(&self, key: &str) -> bool {
        self.update_query(|query| {
            if query.filters.remove(key).is_some() {
                query.page = 0;
            }
        })
    }

    /// Move to the next page if the last known page count allows it
    pub fn next_page(&self) -> bool {
        let (page, total_pages) = {
            let state = self.state.borrow();
            (state.query.page, state.total_pages())
        };
        pagination::has_next(page, total_pages) && self.set_page(page + 1)
    }

    pub fn prev_page(&self) -> bool {
        let page = self.state.borrow().query.page;
        pagination::has_prev(page) && self.set_page(page - 1)
    }

    // Mutations
    //
    // Both helpers are pessimistic: local state only changes after the
    // backend confirmed the operation.

    /// Run a mutation and refetch on success
    ///
    /// # Errors
    /// Returns the normalised error of a failed mutation; the view is left
    /// untouched.
    pub async fn mutate_then_refetch<R, E, Fut>(&self, op: Fut) -> Result<R, FetchError>
    where
        Fut: Future<Output = Result<R, E>>,
        E: Into<FetchError>,
    {
        let value = Self::confirm(op).await?;
        self.refetch();
        Ok(value)
    }

    /// Run a mutation and, on success, patch the displayed items in place
    ///
    /// If a fetch is in flight when the mutation is confirmed, its response
    /// predates the mutation; the view refetches so the patched items are not
    /// overwritten by it.
    ///
    /// # Errors
    /// Returns the normalised error of a failed mutation; `patch` is not
    /// applied.
    pub async fn mutate_and_patch<R, E, Fut, P>(&self, op: Fut, patch: P) -> Result<R, FetchError>
    where
        Fut: Future<Output = Result<R, E>>,
        E: Into<FetchError>,
        P: FnOnce(&mut Vec<T>),
    {
        let value = Self::confirm(op).await?;
        let mut in_flight = false;
        self.state.send_if_modified(|state| {
            in_flight = state.loading();
            match state.fetch.page_mut() {
                Some(page) => {
                    patch(&mut page.items);
                    true
                }
                None => false,
            }
        });
        if in_flight {
            debug!("mutation confirmed during a fetch, refetching");
            self.refetch();
        }
        Ok(value)
    }

    async fn confirm<R, E, Fut>(op: Fut) -> Result<R, FetchError>
    where
        Fut: Future<Output = Result<R, E>>,
        E: Into<FetchError>,
    {
        op.await.map_err(|err| {
            let err = err.into();
            warn!(error = %err, "mutation failed");
            err
        })
    }

    // Dispatch

    fn update_query(&self, change: impl FnOnce(&mut ListQuery)) -> bool {
        let mut request = None;
        self.state.send_if_modified(|state| {
            let mut query = state.query.clone();
            change(&mut query);
            query.page_size = query.page_size.max(1);
            if query == state.query {
                return false;
            }
            state.query = query;
            request = Some(state.begin_fetch());
            true
        });
        match request {
            Some((seq, query)) => {
                self.spawn_fetch(seq, query);
                true
            }
            None => false,
        }
    }

    fn spawn_fetch(&self, seq: u64, query: ListQuery) {
        debug!(
            seq,
            page = query.page,
            page_size = query.page_size,
            search = %query.search,
            "dispatching fetch"
        );

        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            let result = AssertUnwindSafe(fetcher.fetch(&query))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(FetchError::from_panic(&*payload)));
            let failure = result.as_ref().err().cloned();
            let applied = state.send_if_modified(|current| {
                if current.seq != seq {
                    return false;
                }
                current.fetch.complete(result);
                true
            });
            if !applied {
                debug!(seq, "discarding stale response");
            } else if let Some(err) = failure {
                warn!(seq, error = %err, "fetch failed");
            }
        });

        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.take() {
            // A newer fetch was registered first; this one is already stale
            Some((latest, latest_handle)) if latest > seq => {
                if self.options.cancel_superseded {
                    handle.abort();
                }
                *slot = Some((latest, latest_handle));
            }
            Some((_, superseded)) => {
                if self.options.cancel_superseded {
                    superseded.abort();
                }
                *slot = Some((seq, handle));
            }
            None => *slot = Some((seq, handle)),
        }
    }
}

impl<T: Send + 'static> Drop for CollectionView<T> {
    fn drop(&mut self) {
        if !self.options.cancel_superseded {
            return;
        }
        let slot = self.in_flight.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, handle)) = slot.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::fetch_fn;
    use crate::page::PageResult;

    fn numbers() -> impl PageFetcher<u64> {
        fetch_fn(|query: ListQuery| async move {
            let start = query.offset();
            let items: Vec<u64> = (start..start + query.page_size).collect();
            Ok::<_, FetchError>(PageResult::with_page_size(items, 100, query.page_size))
        })
    }

    #[tokio::test]
    async fn test_first_fetch_on_construction() {
        let view = CollectionView::new(numbers(), ListQuery::new(10));
        let state = view.settled().await;
        assert_eq!(state.seq, 1);
        assert_eq!(state.items().to_vec(), (0..10).collect::<Vec<u64>>());
        assert_eq!(state.total_pages(), 10);
    }

    #[tokio::test]
    async fn test_unchanged_query_does_not_fetch() {
        let view = CollectionView::new(numbers(), ListQuery::new(10));
        view.settled().await;
        assert!(!view.set_page(0));
        assert!(!view.set_search(""));
        assert_eq!(view.state().seq, 1);
    }

    #[tokio::test]
    async fn test_next_and_prev_page() {
        let view = CollectionView::new(numbers(), ListQuery::new(50));
        assert!(!view.prev_page());
        view.settled().await;

        assert!(view.next_page());
        let state = view.settled().await;
        assert_eq!(state.query.page, 1);
        assert_eq!(state.items()[0], 50);
        assert_eq!(state.item_range(), Some((51, 100)));

        assert!(!view.next_page());
        assert!(view.prev_page());
        assert_eq!(view.settled().await.query.page, 0);
    }

    #[tokio::test]
    async fn test_filter_changes_reset_page() {
        let view = CollectionView::new(numbers(), ListQuery::new(10).with_page(4));
        view.settled().await;

        assert!(view.set_filter("status", "ACTIVE"));
        assert_eq!(view.query().page, 0);
        assert!(!view.set_filter("status", "ACTIVE"));

        view.set_page(3);
        assert!(view.remove_filter("status"));
        assert_eq!(view.query().page, 0);
        assert!(!view.remove_filter("status"));
    }
}
