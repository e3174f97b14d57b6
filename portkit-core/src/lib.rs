//! Transport-agnostic request pipeline for Portkit.
//!
//! A [`Server`] binds one [`Endpoint`], one [`Decoder`], one [`Encoder`] and
//! one [`ErrorHandler`] into a single decode → invoke → encode pipeline. The
//! transport binding (see `portkit-http`) supplies the raw input and the
//! output sink; everything else is business logic or injected policy.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod codec;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod error_handler;
pub mod server;

pub use codec::{Decoder, Encoder};
pub use context::{Context, RequestId};
pub use endpoint::{BoxError, BoxFuture, Endpoint};
pub use error::{Stage, TransportError};
pub use error_handler::{ErrorHandler, LogErrorHandler, NopErrorHandler};
pub use server::{Outcome, Server};
