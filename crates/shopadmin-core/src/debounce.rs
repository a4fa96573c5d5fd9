//! Debounced search input

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::view::CollectionView;

/// Feeds keystroke-level search text to a view
///
/// Text is applied with [`CollectionView::set_search`] once no newer text
/// arrived for the quiet period, so a burst of keystrokes costs one fetch.
/// Dropping the debouncer discards any pending text.
///
/// [`SearchDebouncer::new`] takes the quiet period from the view's
/// [`ViewOptions::debounce`](crate::config::ViewOptions::debounce).
pub struct SearchDebouncer {
    tx: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Debounce with the quiet period configured on `view`
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<T>(view: Arc<CollectionView<T>>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let quiet = view.options().debounce();
        Self::with_quiet(view, quiet)
    }

    /// Must be called from within a tokio runtime.
    pub fn with_quiet<T>(view: Arc<CollectionView<T>>, quiet: Duration) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let task = tokio::spawn(async move {
            let mut pending: Option<String> = None;
            loop {
                let Some(text) = pending.take() else {
                    match rx.recv().await {
                        Some(text) => pending = Some(text),
                        None => break,
                    }
                    continue;
                };

                tokio::select! {
                    next = rx.recv() => match next {
                        Some(newer) => pending = Some(newer),
                        None => break,
                    },
                    () = sleep(quiet) => {
                        tracing::debug!(search = %text, "applying debounced search");
                        view.set_search(text);
                    }
                }
            }
        });
        Self { tx, task }
    }

    /// Record the latest text of the search box
    pub fn push(&self, text: impl Into<String>) {
        // The task only stops once this debouncer is dropped
        let _ = self.tx.send(text.into());
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use shopadmin_api::ListQuery;

    use super::*;
    use crate::config::ViewOptions;
    use crate::error::FetchError;
    use crate::fetcher::fetch_fn;
    use crate::page::PageResult;

    fn recording_view(searches: Arc<Mutex<Vec<String>>>) -> Arc<CollectionView<String>> {
        recording_view_with(searches, ViewOptions::default())
    }

    fn recording_view_with(
        searches: Arc<Mutex<Vec<String>>>,
        options: ViewOptions,
    ) -> Arc<CollectionView<String>> {
        let fetcher = fetch_fn(move |query: ListQuery| {
            let searches = Arc::clone(&searches);
            async move {
                searches.lock().unwrap().push(query.search.clone());
                Ok::<_, FetchError>(PageResult::new(vec![query.search], 1, 1))
            }
        });
        Arc::new(CollectionView::with_options(fetcher, ListQuery::new(10), options))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_applies_last_value_once() {
        let searches = Arc::new(Mutex::new(Vec::new()));
        let view = recording_view(Arc::clone(&searches));
        view.settled().await;

        let debouncer = SearchDebouncer::new(Arc::clone(&view));
        debouncer.push("m");
        sleep(Duration::from_millis(100)).await;
        debouncer.push("mu");
        sleep(Duration::from_millis(100)).await;
        debouncer.push("mug");

        sleep(Duration::from_millis(250)).await;
        assert_eq!(view.query().search, "");

        sleep(Duration::from_millis(100)).await;
        assert_eq!(view.query().search, "mug");

        let state = view.settled().await;
        assert_eq!(state.items(), &["mug".to_string()]);
        assert_eq!(*searches.lock().unwrap(), vec!["", "mug"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_text() {
        let searches = Arc::new(Mutex::new(Vec::new()));
        let view = recording_view(Arc::clone(&searches));
        view.settled().await;

        let debouncer = SearchDebouncer::with_quiet(Arc::clone(&view), Duration::from_millis(300));
        debouncer.push("chair");
        sleep(Duration::from_millis(50)).await;
        drop(debouncer);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(view.query().search, "");
        assert_eq!(searches.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_comes_from_view_options() {
        let searches = Arc::new(Mutex::new(Vec::new()));
        let options = ViewOptions {
            debounce_ms: 1000,
            ..ViewOptions::default()
        };
        let view = recording_view_with(Arc::clone(&searches), options);
        view.settled().await;

        let debouncer = SearchDebouncer::new(Arc::clone(&view));
        debouncer.push("lamp");

        // Past the default 300ms but inside the configured second
        sleep(Duration::from_millis(600)).await;
        assert_eq!(view.query().search, "");

        sleep(Duration::from_millis(500)).await;
        assert_eq!(view.query().search, "lamp");
        view.settled().await;
        assert_eq!(*searches.lock().unwrap(), vec!["", "lamp"]);
    }
}
