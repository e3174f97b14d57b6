//! Transport-level limits for [`HttpServer`](crate::HttpServer).

use std::time::Duration;

/// Default request body limit: 2 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Limits applied by [`HttpServer`](crate::HttpServer) to every request.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct HttpConfig {
    /// Maximum request body size the decoder may read.
    pub max_body_bytes: usize,

    /// Maximum response body size the encoder may write. `None` is
    /// unlimited.
    pub max_response_bytes: Option<usize>,

    /// Deadline placed on each request's [`Context`](portkit_core::Context).
    /// The pipeline does not enforce it; endpoints may.
    pub request_timeout: Option<Duration>,
}

impl HttpConfig {
    /// Create a config with the defaults: 2 MiB bodies, unlimited
    /// responses, no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_response_bytes: None,
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub fn with_max_response_bytes(mut self, max_response_bytes: usize) -> Self {
        self.max_response_bytes = Some(max_response_bytes);
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}
