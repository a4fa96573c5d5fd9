//! HTTP client for the shop admin backend

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use shopadmin_api::{
    AssignShipperRequest, ErrorBody, ListQuery, OrderStatus, Resource, UpdateOrderStatusRequest,
};

use crate::error::{ClientError, Result};

/// HTTP client for communicating with the shop admin backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client
    ///
    /// Paths are resolved relative to `base_url`, so `http://host/api`
    /// and `http://host/api/` both list products at `http://host/api/products`.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use shopadmin_client::HttpClient;
    ///
    /// let client = HttpClient::new("http://localhost:8080/api")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client whose requests fail with [`ClientError::Timeout`]
    /// after `timeout`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the TLS backend
    /// cannot be initialised.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Http)?;
        Self::with_client(base_url, client)
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL from a path relative to the base
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(ClientError::Url)
    }

    /// Send a request and decode a JSON body; an empty body decodes as `null`
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Perform a GET request and deserialize the response
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(method = "GET", %url, "request");
        self.send(self.client.get(url)).await
    }

    /// Perform a POST request with JSON body
    async fn post<T: DeserializeOwned>(&self, path: &str, body: impl Serialize) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(method = "POST", %url, "request");
        self.send(self.client.post(url).json(&body)).await
    }

    /// Perform a PATCH request with JSON body
    async fn patch<T: DeserializeOwned>(&self, path: &str, body: impl Serialize) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(method = "PATCH", %url, "request");
        self.send(self.client.patch(url).json(&body)).await
    }

    /// Perform a PUT request with JSON body
    async fn put<T: DeserializeOwned>(&self, path: &str, body: impl Serialize) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(method = "PUT", %url, "request");
        self.send(self.client.put(url).json(&body)).await
    }

    /// Perform a DELETE request
    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        tracing::debug!(method = "DELETE", %url, "request");
        let response = self.client.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    // List endpoints

    /// Fetch one page of `path` as raw JSON
    ///
    /// The envelope is left undecoded; callers pick the adapter that
    /// matches the endpoint.
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn list_raw(&self, path: &str, query: &ListQuery) -> Result<Value> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().extend_pairs(query.to_pairs());
        tracing::debug!(
            method = "GET",
            %url,
            page = query.page,
            page_size = query.page_size,
            "list request"
        );
        self.send(self.client.get(url)).await
    }

    /// List a resource with optional filtering and pagination
    ///
    /// # Example
    /// ```no_run
    /// # use shopadmin_client::HttpClient;
    /// # use shopadmin_api::Resource;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = HttpClient::new("http://localhost:8080/api")?;
    /// let page = client.list(Resource::Orders)
    ///     .page(1)
    ///     .page_size(25)
    ///     .filter("status", "PENDING")
    ///     .send()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn list(&self, resource: Resource) -> ListBuilder {
        ListBuilder::new(self.clone(), resource)
    }

    // Item endpoints

    /// Get a single item by id
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn get_item(&self, resource: Resource, id: &str) -> Result<Value> {
        self.get(&item_path(resource, id)).await
    }

    /// Create an item
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn create(&self, resource: Resource, body: Value) -> Result<Value> {
        self.post(resource.path(), body).await
    }

    /// Partially update an item
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn update(&self, resource: Resource, id: &str, body: Value) -> Result<Value> {
        self.patch(&item_path(resource, id), body).await
    }

    /// Replace an item
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn replace(&self, resource: Resource, id: &str, body: Value) -> Result<Value> {
        self.put(&item_path(resource, id), body).await
    }

    /// Delete an item
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn delete_item(&self, resource: Resource, id: &str) -> Result<()> {
        self.delete(&item_path(resource, id)).await
    }

    // Order actions

    /// Move an order to a new fulfilment status
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Value> {
        let request = UpdateOrderStatusRequest { status };
        self.patch(&format!("{}/status", item_path(Resource::Orders, id)), request)
            .await
    }

    /// Assign a shipper to an order
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn assign_shipper(&self, order_id: &str, shipper_id: &str) -> Result<Value> {
        let request = AssignShipperRequest {
            shipper_id: shipper_id.to_string(),
        };
        self.patch(
            &format!("{}/shipper", item_path(Resource::Orders, order_id)),
            request,
        )
        .await
    }

    // Notification actions

    /// Mark one notification as read
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn mark_notification_read(&self, id: &str) -> Result<Value> {
        self.patch(
            &format!("{}/read", item_path(Resource::Notifications, id)),
            serde_json::json!({}),
        )
        .await
    }

    /// Mark every notification as read
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn mark_all_notifications_read(&self) -> Result<Value> {
        self.patch(
            &format!("{}/read-all", Resource::Notifications.path()),
            serde_json::json!({}),
        )
        .await
    }
}

fn item_path(resource: Resource, id: &str) -> String {
    let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    // form encoding writes spaces as '+', which a path would read literally
    format!("{}/{}", resource.path(), id.replace('+', "%20"))
}

/// Turn a non-2xx response into [`ClientError::Api`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = api_message(&text)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    tracing::warn!(status = status.as_u16(), %message, "API error");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Message of an error body: structured `message`/`error` or the raw text
fn api_message(text: &str) -> Option<String> {
    if let Some(message) = serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(ErrorBody::into_message)
    {
        return Some(message);
    }
    let text = text.trim();
    (!text.is_empty() && !text.starts_with('{')).then(|| text.to_string())
}

/// Builder for listing a resource with filters
#[derive(Debug, Clone)]
pub struct ListBuilder {
    client: HttpClient,
    resource: Resource,
    query: ListQuery,
}

impl ListBuilder {
    fn new(client: HttpClient, resource: Resource) -> Self {
        Self {
            client,
            resource,
            query: resource.default_query(),
        }
    }

    /// Set zero-based page number (default: 0)
    #[must_use]
    pub fn page(mut self, page: u64) -> Self {
        self.query.page = page;
        self
    }

    /// Set items per page (default: the resource's page size)
    #[must_use]
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.query = self.query.with_page_size(page_size);
        self
    }

    /// Free-text search
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.query.search = search.into();
        self
    }

    /// Sort key understood by the backend (`latest`, `price`, ...)
    #[must_use]
    pub fn sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.query.sort_by = Some(sort_by.into());
        self
    }

    /// Add a resource-specific filter
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query = self.query.with_filter(key, value);
        self
    }

    /// The query this builder will send
    #[must_use]
    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Execute the request
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend returns an error.
    pub async fn send(self) -> Result<Value> {
        self.client.list_raw(self.resource.path(), &self.query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new("http://localhost:8080");
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::new("not a url");
        assert!(client.is_err());
    }

    #[test]
    fn test_url_building() {
        let client = HttpClient::new("http://localhost:8080").unwrap();
        let url = client.url("/products").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/products");
    }

    #[test]
    fn test_url_building_keeps_base_path() {
        for base in ["http://localhost:8080/api", "http://localhost:8080/api/"] {
            let client = HttpClient::new(base).unwrap();
            let url = client.url("orders/7/status").unwrap();
            assert_eq!(url.as_str(), "http://localhost:8080/api/orders/7/status");
        }
    }

    #[test]
    fn test_item_path_escapes_id() {
        assert_eq!(item_path(Resource::Posts, "a/b c"), "posts/a%2Fb%20c");
        assert_eq!(item_path(Resource::Users, "42"), "users/42");
    }

    #[test]
    fn test_list_builder_query() {
        let client = HttpClient::new("http://localhost:8080").unwrap();
        let builder = client
            .list(Resource::Products)
            .page(2)
            .page_size(24)
            .search("mug")
            .sort_by("price")
            .filter("categoryId", "3");

        let query = builder.query();
        assert_eq!(query.page, 2);
        assert_eq!(query.page_size, 24);
        assert_eq!(query.search, "mug");
        assert_eq!(query.sort_by.as_deref(), Some("price"));
        assert_eq!(query.filters.get("categoryId").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_list_builder_starts_from_resource_defaults() {
        let client = HttpClient::new("http://localhost:8080").unwrap();
        let builder = client.list(Resource::Products);
        assert_eq!(builder.query(), &Resource::Products.default_query());
    }

    #[test]
    fn test_api_message_extraction() {
        assert_eq!(
            api_message(r#"{"message":"Category has products"}"#).as_deref(),
            Some("Category has products")
        );
        assert_eq!(api_message("upstream down").as_deref(), Some("upstream down"));
        assert_eq!(api_message(r#"{"status":500}"#), None);
        assert_eq!(api_message("  "), None);
    }
}
