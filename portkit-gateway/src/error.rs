//! Error types for the gateway crate.

use portkit_http::StatusError;

/// Errors returned by the gateway's endpoints.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// No user is registered under the requested ID.
    #[error("user not found: {0}")]
    UserNotFound(u64),

    /// The request is well-formed JSON but semantically invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<GatewayError> for StatusError {
    fn from(err: GatewayError) -> Self {
        match &err {
            GatewayError::UserNotFound(_) => StatusError::not_found(err.to_string()),
            GatewayError::InvalidRequest(_) => StatusError::bad_request(err.to_string()),
        }
    }
}
