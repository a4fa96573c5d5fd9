//! Response adapters
//!
//! List endpoints disagree on their envelope. An adapter turns the raw JSON
//! body of one endpoint into a [`PageResult`], keeping the view-model
//! shape-agnostic.

use serde::de::DeserializeOwned;
use serde_json::Value;

use shopadmin_api::{ContentEnvelope, DataEnvelope, EnvelopeShape, ListQuery};

use crate::error::FetchError;
use crate::page::PageResult;

/// Normalises a raw list response into a page
pub trait ResponseAdapter<T>: Send + Sync {
    /// # Errors
    /// Returns [`FetchError::InvalidResponse`] if `raw` is not the expected
    /// envelope.
    fn adapt(&self, raw: Value, query: &ListQuery) -> Result<PageResult<T>, FetchError>;
}

/// `{ "content": [...], "page": { "totalElements", "totalPages" } }`
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPageAdapter;

impl<T: DeserializeOwned> ResponseAdapter<T> for ContentPageAdapter {
    fn adapt(&self, raw: Value, _query: &ListQuery) -> Result<PageResult<T>, FetchError> {
        let envelope: ContentEnvelope<T> = decode(raw, "content/page")?;
        Ok(PageResult::new(
            envelope.content,
            envelope.page.total_elements,
            envelope.page.total_pages,
        ))
    }
}

/// `{ "data": [...], "total": n }`; the page count is derived from the
/// query's page size
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTotalAdapter;

impl<T: DeserializeOwned> ResponseAdapter<T> for DataTotalAdapter {
    fn adapt(&self, raw: Value, query: &ListQuery) -> Result<PageResult<T>, FetchError> {
        let envelope: DataEnvelope<T> = decode(raw, "data/total")?;
        Ok(PageResult::with_page_size(
            envelope.data,
            envelope.total,
            query.page_size,
        ))
    }
}

/// Picks the adapter for a declared envelope shape
#[derive(Debug, Clone, Copy)]
pub struct ShapeAdapter(pub EnvelopeShape);

impl<T: DeserializeOwned> ResponseAdapter<T> for ShapeAdapter {
    fn adapt(&self, raw: Value, query: &ListQuery) -> Result<PageResult<T>, FetchError> {
        match self.0 {
            EnvelopeShape::ContentPage => ContentPageAdapter.adapt(raw, query),
            EnvelopeShape::DataTotal => DataTotalAdapter.adapt(raw, query),
        }
    }
}

/// Adapter backed by a closure, for one-off envelopes
pub struct FnAdapter<F>(pub F);

impl<T, F> ResponseAdapter<T> for FnAdapter<F>
where
    F: Fn(Value, &ListQuery) -> Result<PageResult<T>, FetchError> + Send + Sync,
{
    fn adapt(&self, raw: Value, query: &ListQuery) -> Result<PageResult<T>, FetchError> {
        (self.0)(raw, query)
    }
}

fn decode<E: DeserializeOwned>(raw: Value, shape: &str) -> Result<E, FetchError> {
    serde_json::from_value(raw)
        .map_err(|e| FetchError::InvalidResponse(format!("expected {shape} envelope: {e}")))
}
