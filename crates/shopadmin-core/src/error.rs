//! Fetch error normalisation

use thiserror::Error;

use shopadmin_client::ClientError;

/// A failed fetch or mutation, normalised for display
///
/// `Display` is the bare human-readable message so views can render it
/// directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never got an answer (offline, timeout, refused)
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Application {
        /// HTTP status code
        status: u16,
        /// Message from the error body
        message: String,
    },

    /// The backend answered 2xx with a body we could not interpret
    #[error("{0}")]
    InvalidResponse(String),

    /// The fetcher or adapter panicked before producing a result
    #[error("{0}")]
    Internal(String),
}

impl FetchError {
    /// Human-readable message
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            FetchError::Transport(message)
            | FetchError::Application { message, .. }
            | FetchError::InvalidResponse(message)
            | FetchError::Internal(message) => message,
        }
    }

    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    /// HTTP status for application failures
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl FetchError {
    /// Error for a fetch that panicked, keeping the panic message if any
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned());
        match detail {
            Some(detail) => FetchError::Internal(format!("fetch panicked: {detail}")),
            None => FetchError::Internal("fetch panicked".to_string()),
        }
    }
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status, message } => FetchError::Application { status, message },
            ClientError::Json(e) => FetchError::InvalidResponse(e.to_string()),
            ClientError::InvalidResponse(message) => FetchError::InvalidResponse(message),
            other @ (ClientError::Http(_) | ClientError::Timeout | ClientError::Url(_)) => {
                FetchError::Transport(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = FetchError::Transport("network error".into());
        assert_eq!(err.to_string(), "network error");
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_from_api_error_keeps_status() {
        let err: FetchError = ClientError::Api {
            status: 409,
            message: "Coupon code already exists".into(),
        }
        .into();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.message(), "Coupon code already exists");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_from_timeout_is_transport() {
        let err: FetchError = ClientError::Timeout.into();
        assert!(err.is_transport());
        assert_eq!(err.message(), "Request timed out");
    }

    #[test]
    fn test_from_panic_keeps_message() {
        let err = FetchError::from_panic(&"adapter exploded");
        assert_eq!(err.message(), "fetch panicked: adapter exploded");
        assert!(!err.is_transport());

        let err = FetchError::from_panic(&42_u8);
        assert_eq!(err.to_string(), "fetch panicked");
    }
}
