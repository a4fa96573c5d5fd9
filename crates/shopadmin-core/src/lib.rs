//! shopadmin-core: Paginated remote-collection view-model
//!
//! Every list screen of the admin (users, products, categories, orders,
//! coupons, posts, notifications) is a [`CollectionView`] over a
//! [`PageFetcher`]. The view owns the query, dispatches one fetch per query
//! change, discards responses to superseded requests and exposes
//! loading/error/data state plus pessimistic mutation helpers.
//!
//! # Example
//!
//! ```no_run
//! use shopadmin_api::Resource;
//! use shopadmin_client::HttpClient;
//! use shopadmin_core::{CollectionView, HttpPageFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("http://localhost:8080/api")?;
//! let fetcher = HttpPageFetcher::for_resource(client, Resource::Products);
//! let products = CollectionView::<serde_json::Value>::new(
//!     fetcher,
//!     Resource::Products.default_query(),
//! );
//!
//! products.set_search("mug");
//! let state = products.settled().await;
//! println!("{} of {} products", state.items().len(), state.total());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fetcher;
pub mod notifications;
pub mod page;
pub mod pagination;
pub mod view;

pub use adapter::{ContentPageAdapter, DataTotalAdapter, FnAdapter, ResponseAdapter, ShapeAdapter};
pub use config::ViewOptions;
pub use debounce::SearchDebouncer;
pub use error::FetchError;
pub use fetcher::{FnFetcher, HttpPageFetcher, PageFetcher, fetch_fn};
pub use notifications::NotificationFeed;
pub use page::{FetchState, PageResult};
pub use view::{CollectionView, ViewState};
