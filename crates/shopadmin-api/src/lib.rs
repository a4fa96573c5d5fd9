//! shopadmin-api: Shared wire types
//!
//! Contains the list query, response envelopes, resource catalogue, request
//! bodies and typed records used across the client, the view-model core and
//! the CLI.

pub mod error;
pub mod query;
pub mod records;
pub mod requests;
pub mod resources;
pub mod responses;

pub use error::ApiError;
pub use query::ListQuery;
pub use records::Notification;
pub use requests::{AssignShipperRequest, OrderStatus, UpdateOrderStatusRequest};
pub use resources::{EnvelopeShape, Resource};
pub use responses::{ContentEnvelope, DataEnvelope, ErrorBody, PageMeta};
