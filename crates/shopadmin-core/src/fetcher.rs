//! Page fetchers: where a view gets its pages from

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use shopadmin_api::{ListQuery, Resource};
use shopadmin_client::HttpClient;

use crate::adapter::{ResponseAdapter, ShapeAdapter};
use crate::error::FetchError;
use crate::page::PageResult;

/// Source of pages for a collection view
#[async_trait]
pub trait PageFetcher<T: Send + 'static>: Send + Sync {
    /// Fetch the page described by `query`
    async fn fetch(&self, query: &ListQuery) -> Result<PageResult<T>, FetchError>;
}

/// Fetcher backed by an async closure
pub struct FnFetcher<F>(F);

/// Wrap an async closure as a [`PageFetcher`]
///
/// # Example
/// ```
/// use shopadmin_core::{FetchError, PageResult, fetch_fn};
///
/// let fetcher = fetch_fn(|query| async move {
///     Ok::<_, FetchError>(PageResult::new(vec![query.page], 1, 1))
/// });
/// # let _ = fetcher;
/// ```
pub fn fetch_fn<T, F, Fut>(f: F) -> FnFetcher<F>
where
    F: Fn(ListQuery) -> Fut,
    Fut: Future<Output = Result<PageResult<T>, FetchError>>,
{
    FnFetcher(f)
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnFetcher<F>
where
    T: Send + 'static,
    F: Fn(ListQuery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PageResult<T>, FetchError>> + Send + 'static,
{
    async fn fetch(&self, query: &ListQuery) -> Result<PageResult<T>, FetchError> {
        (self.0)(query.clone()).await
    }
}

/// Fetches pages of one endpoint over HTTP
pub struct HttpPageFetcher<T, A> {
    client: HttpClient,
    path: String,
    adapter: A,
    _item: PhantomData<fn() -> T>,
}

impl<T, A> HttpPageFetcher<T, A>
where
    A: ResponseAdapter<T>,
{
    pub fn new(client: HttpClient, path: impl Into<String>, adapter: A) -> Self {
        Self {
            client,
            path: path.into(),
            adapter,
            _item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> HttpPageFetcher<T, ShapeAdapter> {
    /// Fetcher for a catalogued resource, using its declared envelope
    #[must_use]
    pub fn for_resource(client: HttpClient, resource: Resource) -> Self {
        Self::new(client, resource.path(), ShapeAdapter(resource.envelope()))
    }
}

#[async_trait]
impl<T, A> PageFetcher<T> for HttpPageFetcher<T, A>
where
    T: Send + 'static,
    A: ResponseAdapter<T> + 'static,
{
    async fn fetch(&self, query: &ListQuery) -> Result<PageResult<T>, FetchError> {
        let raw = self.client.list_raw(&self.path, query).await?;
        self.adapter.adapt(raw, query)
    }
}
