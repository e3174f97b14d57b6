//! In-memory response sink written by encoders.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};

use crate::CodecError;

/// Buffered HTTP response under construction.
///
/// Starts as `200 OK` with no headers and an empty body. Writes are
/// all-or-nothing: a write that would exceed the optional byte limit fails
/// without appending anything.
#[derive(Debug, Default)]
pub struct ResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    limit: Option<usize>,
}

impl ResponseSink {
    /// Create an unlimited sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that accepts at most `limit` body bytes.
    #[must_use]
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { limit, ..Self::default() }
    }

    /// Append `bytes` to the body.
    ///
    /// # Errors
    /// Returns [`CodecError::ResponseTooLarge`] if the body would exceed the
    /// sink's limit; the body is left unchanged.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let size = self.body.len() + bytes.len();
        if let Some(limit) = self.limit {
            if size > limit {
                return Err(CodecError::ResponseTooLarge { size, limit });
            }
        }
        self.body.extend_from_slice(bytes);
        Ok(())
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Discard status, headers and body written so far. The limit is kept.
    pub fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Convert into an axum response.
    #[must_use]
    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
