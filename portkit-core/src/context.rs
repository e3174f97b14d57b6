//! Per-request context carried through every pipeline stage.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Unique identifier for a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner `Uuid`.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Request-scoped values handed to the decoder, the endpoint, the encoder
/// and the error handler.
///
/// The pipeline itself never inspects the deadline. Collaborators that want
/// early exit on expiry check [`Context::is_expired`] themselves.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: RequestId,
    received_at: DateTime<Utc>,
    deadline: Option<Instant>,
}

impl Context {
    /// Create a context with a fresh request ID and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            received_at: Utc::now(),
            deadline: None,
        }
    }

    /// Replace the request ID, e.g. with one propagated by the caller.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Set an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Wall-clock time at which the request was received.
    #[must_use]
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline. `None` when no deadline is set;
    /// `Some(Duration::ZERO)` once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Return `true` if a deadline is set and has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_without_deadline_never_expires() {
        let ctx = Context::new();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_expired(), "no deadline means never expired");
    }

    #[test]
    fn context_past_deadline_is_expired() {
        let ctx = Context::new().with_deadline(Instant::now());
        assert!(ctx.is_expired(), "deadline at now must count as expired");
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn context_with_timeout_is_not_yet_expired() {
        let ctx = Context::new().with_timeout(Duration::from_secs(60));
        assert!(!ctx.is_expired());
        let left = match ctx.remaining() {
            Some(d) => d,
            None => panic!("timeout must set a deadline"),
        };
        assert!(left > Duration::from_secs(59), "remaining too small: {left:?}");
    }

    #[test]
    fn context_clone_keeps_request_id() {
        let id = RequestId::from(Uuid::nil());
        let ctx = Context::new().with_request_id(id);
        assert_eq!(ctx.clone().request_id(), id);
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }
}
