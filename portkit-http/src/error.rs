//! Error types for the HTTP binding.

use std::error::Error as StdError;

use axum::http::StatusCode;
use http_body_util::LengthLimitError;
use portkit_core::BoxError;

/// Errors raised by the reference HTTP codecs and the response sink.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[source] BoxError),

    /// The request body exceeded the configured byte limit.
    #[error("request body exceeds the configured limit")]
    BodyTooLarge,

    /// A path parameter could not be extracted from the routing data.
    #[error("invalid path parameter: {0}")]
    InvalidPathParam(String),

    /// The request body is not valid JSON.
    #[error("malformed JSON body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// The body is valid JSON but not an object, while path parameters
    /// also need to be merged into the request.
    #[error("request body must be a JSON object when path parameters are present")]
    BodyShape,

    /// Path parameters and body do not match the request type.
    #[error("request does not match the expected shape: {0}")]
    Schema(#[source] serde_json::Error),

    /// The response could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Writing the response would exceed the sink's byte limit.
    #[error("response of {size} bytes exceeds the {limit}-byte limit")]
    ResponseTooLarge { size: usize, limit: usize },
}

impl CodecError {
    /// Classify a body read failure, detecting a length-limit violation
    /// anywhere in the source chain.
    #[must_use]
    pub fn from_body_error(err: BoxError) -> Self {
        let mut current: Option<&(dyn StdError + 'static)> = Some(&*err);
        while let Some(e) = current {
            if e.is::<LengthLimitError>() {
                return CodecError::BodyTooLarge;
            }
            current = e.source();
        }
        CodecError::Body(err)
    }
}

/// An endpoint error that carries the HTTP status it should be reported
/// with.
///
/// [`JsonErrorEncoder`](crate::JsonErrorEncoder) recognises this type;
/// any other endpoint error is reported as `500`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct StatusError {
    status: StatusCode,
    message: String,
}

impl StatusError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// `404 Not Found` with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// `400 Bad Request` with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
