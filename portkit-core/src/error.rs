//! Error taxonomy for the request pipeline.

use std::fmt;

use crate::BoxError;

/// The pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Turning the transport input into a typed request.
    Decode,
    /// Running the business logic.
    Endpoint,
    /// Writing the typed response to the sink.
    Encode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Decode => "decode",
            Stage::Endpoint => "endpoint",
            Stage::Encode => "encode",
        })
    }
}

/// A failure handed to the [`ErrorHandler`](crate::ErrorHandler).
///
/// Each variant wraps the exact error returned by the failing collaborator,
/// so handlers can both branch on the stage and downcast the cause.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The inbound payload could not be turned into a request value.
    #[error("decode failed: {0}")]
    Decode(#[source] BoxError),

    /// The endpoint returned an error.
    #[error("endpoint failed: {0}")]
    Endpoint(#[source] BoxError),

    /// The response could not be serialized or written.
    #[error("encode failed: {0}")]
    Encode(#[source] BoxError),
}

impl TransportError {
    /// Return the stage that failed.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            TransportError::Decode(_) => Stage::Decode,
            TransportError::Endpoint(_) => Stage::Endpoint,
            TransportError::Encode(_) => Stage::Encode,
        }
    }

    /// Borrow the collaborator's original error.
    #[must_use]
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        match self {
            TransportError::Decode(e) | TransportError::Endpoint(e) | TransportError::Encode(e) => {
                e.as_ref()
            }
        }
    }

    /// Take the collaborator's original error.
    #[must_use]
    pub fn into_inner(self) -> BoxError {
        match self {
            TransportError::Decode(e) | TransportError::Endpoint(e) | TransportError::Encode(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("row 7 missing")]
    struct Missing;

    #[test]
    fn transport_error_stage_matches_variant() {
        assert_eq!(TransportError::Decode("x".into()).stage(), Stage::Decode);
        assert_eq!(TransportError::Endpoint("x".into()).stage(), Stage::Endpoint);
        assert_eq!(TransportError::Encode("x".into()).stage(), Stage::Encode);
    }

    #[test]
    fn transport_error_inner_downcasts_to_original() {
        let err = TransportError::Endpoint(Box::new(Missing));
        assert!(err.inner().downcast_ref::<Missing>().is_some(), "inner must be the original error");
        assert!(err.source().is_some(), "source must be wired");
        assert_eq!(err.to_string(), "endpoint failed: row 7 missing");
        assert!(err.into_inner().is::<Missing>());
    }

    #[test]
    fn stage_display_is_lowercase() {
        assert_eq!(Stage::Decode.to_string(), "decode");
        assert_eq!(Stage::Endpoint.to_string(), "endpoint");
        assert_eq!(Stage::Encode.to_string(), "encode");
    }
}
