//! shopadmin-client: HTTP client library
//!
//! Typed access to the shop admin backend: paginated list endpoints
//! returned as raw JSON envelopes, plus create/update/delete and the
//! resource-specific actions (order status, shipper assignment,
//! notification read state).
//!
//! # Example
//!
//! ```no_run
//! use shopadmin_api::{OrderStatus, Resource};
//! use shopadmin_client::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("http://localhost:8080/api")?;
//!
//! // First page of products matching "mug"
//! let page = client.list(Resource::Products)
//!     .search("mug")
//!     .send()
//!     .await?;
//!
//! // Ship an order
//! client.update_order_status("1001", OrderStatus::Shipping).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;

pub use error::{ClientError, Result};
pub use http::{HttpClient, ListBuilder};
