//! Rendering of failed requests onto the response sink.
//!
//! Runs after the [`ErrorHandler`](portkit_core::ErrorHandler) has been told
//! about the failure. The handler owns side effects; the error encoder only
//! decides what the client sees.

use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use portkit_core::{Context, Stage, TransportError};
use serde_json::json;

use crate::{CodecError, ResponseSink, StatusError};

/// Writes a failure response to the sink.
pub trait ErrorEncoder: Send + Sync {
    fn encode_error(&self, ctx: &Context, err: &TransportError, sink: &mut ResponseSink);
}

impl<F> ErrorEncoder for F
where
    F: Fn(&Context, &TransportError, &mut ResponseSink) + Send + Sync,
{
    fn encode_error(&self, ctx: &Context, err: &TransportError, sink: &mut ResponseSink) {
        (self)(ctx, err, sink);
    }
}

/// Leaves the sink as the pipeline left it.
///
/// This is what [`HttpServer`](crate::HttpServer) uses unless told
/// otherwise: failure reporting belongs to the
/// [`ErrorHandler`](portkit_core::ErrorHandler), and a failed request goes
/// out with no status, header or byte set on its behalf.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopErrorEncoder;

impl ErrorEncoder for NopErrorEncoder {
    fn encode_error(&self, _ctx: &Context, _err: &TransportError, _sink: &mut ResponseSink) {}
}

/// Opt-in error encoder: `{"error": "<message>"}` with a status derived
/// from the failing stage.
///
/// | stage    | status                                              |
/// |----------|-----------------------------------------------------|
/// | decode   | 413 for an oversized body, otherwise 400            |
/// | endpoint | [`StatusError::status`] if the error is one, else 500 |
/// | encode   | 500                                                 |
///
/// Messages of 500 responses are replaced with a generic text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorEncoder;

impl ErrorEncoder for JsonErrorEncoder {
    fn encode_error(&self, ctx: &Context, err: &TransportError, sink: &mut ResponseSink) {
        let status = status_for(err);
        let message = if status.is_server_error() {
            "internal server error".to_owned()
        } else {
            err.inner().to_string()
        };

        sink.reset();
        sink.set_status(status);
        let body = json!({ "error": message }).to_string();
        match sink.write_all(body.as_bytes()) {
            Ok(()) => sink.insert_header(CONTENT_TYPE, HeaderValue::from_static("application/json")),
            Err(e) => tracing::debug!(request_id = %ctx.request_id(), error = %e, "error body dropped"),
        }
    }
}

/// Map a pipeline failure to an HTTP status.
#[must_use]
pub fn status_for(err: &TransportError) -> StatusCode {
    match err.stage() {
        Stage::Decode => match err.inner().downcast_ref::<CodecError>() {
            Some(CodecError::BodyTooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        },
        Stage::Endpoint => err
            .inner()
            .downcast_ref::<StatusError>()
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, StatusError::status),
        Stage::Encode => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
