//! HTTP binding for the Portkit pipeline.
//!
//! Provides the reference codec pair (path parameters merged with a JSON body
//! on the way in, JSON on the way out), an in-memory [`ResponseSink`], and
//! [`HttpServer`], a `tower` service that mounts any endpoint on an axum
//! `Router`.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod codec;
pub mod config;
pub mod error;
pub mod error_encoder;
pub mod params;
pub mod server;
pub mod sink;

pub use codec::{decode_fields, decode_request, encode_json_response};
pub use config::HttpConfig;
pub use error::{CodecError, StatusError};
pub use error_encoder::{ErrorEncoder, JsonErrorEncoder, NopErrorEncoder};
pub use params::PathParams;
pub use server::{new_endpoint, new_server, HttpServer, REQUEST_ID_HEADER};
pub use sink::ResponseSink;
