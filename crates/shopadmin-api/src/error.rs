//! Error types for parsing wire values

use thiserror::Error;

/// Errors raised when a textual value does not name a known wire value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Resource name not in the catalogue
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// Order status not recognised
    #[error("unknown order status: {0}")]
    UnknownOrderStatus(String),
}
