//! The decode → invoke → encode pipeline.
//!
//! Each call to [`Server::serve`] is an independent run of the state machine
//!
//! ```text
//! Idle → Decoding → Invoking → Encoding → Done
//!            │          │          │
//!            └──────────┴──────────┴──→ Failed
//! ```
//!
//! Stages run strictly in order. The first failure ends the run and is handed
//! to the error handler exactly once; a run that reaches `Done` never touches
//! the handler.

use std::sync::Arc;

use crate::{Context, Decoder, Encoder, Endpoint, ErrorHandler, TransportError};

/// Terminal state of one pipeline run.
#[derive(Debug)]
#[must_use]
pub enum Outcome {
    /// All three stages succeeded and the response is in the sink.
    Done,
    /// A stage failed. The error handler has already seen this error; the
    /// transport may use it to render a failure response but must not
    /// report it again.
    Failed(TransportError),
}

impl Outcome {
    /// Return `true` if the run reached `Done`.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done)
    }
}

/// Binds an endpoint, a decoder, an encoder and an error handler into one
/// transport-facing pipeline.
///
/// - `In`: raw transport input consumed by the decoder.
/// - `Sink`: transport output the encoder writes to.
/// - `Req` / `Resp`: the endpoint's typed request and response.
///
/// A `Server` is immutable after construction, so one instance can serve any
/// number of concurrent requests. Cloning is cheap and shares every
/// component.
pub struct Server<In, Sink, Req, Resp>
where
    In: Send + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    endpoint: Arc<dyn Endpoint<Req, Resp>>,
    decoder: Arc<dyn Decoder<In, Req>>,
    encoder: Arc<dyn Encoder<Sink, Resp>>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl<In, Sink, Req, Resp> Server<In, Sink, Req, Resp>
where
    In: Send + 'static,
    Sink: Send,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Create a server from all four components.
    ///
    /// The error handler is mandatory; pass
    /// [`LogErrorHandler`](crate::LogErrorHandler) or
    /// [`NopErrorHandler`](crate::NopErrorHandler) for the stock policies.
    #[must_use]
    pub fn new<E, D, C, H>(endpoint: E, decoder: D, encoder: C, error_handler: H) -> Self
    where
        E: Endpoint<Req, Resp> + 'static,
        D: Decoder<In, Req> + 'static,
        C: Encoder<Sink, Resp> + 'static,
        H: ErrorHandler + 'static,
    {
        Self {
            endpoint: Arc::new(endpoint),
            decoder: Arc::new(decoder),
            encoder: Arc::new(encoder),
            error_handler: Arc::new(error_handler),
        }
    }

    /// Replace the error handler.
    #[must_use]
    pub fn with_error_handler<H: ErrorHandler + 'static>(self, error_handler: H) -> Self {
        self.with_shared_error_handler(Arc::new(error_handler))
    }

    /// Replace the error handler with one shared across several servers.
    #[must_use]
    pub fn with_shared_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = error_handler;
        self
    }

    /// Run one request through the pipeline.
    ///
    /// On [`Outcome::Done`] the encoded response is in `sink`. On
    /// [`Outcome::Failed`] the error handler has been invoked once with the
    /// returned error and no later stage has run.
    pub async fn serve(&self, ctx: &Context, input: In, sink: &mut Sink) -> Outcome {
        let req = match self.decoder.decode(ctx.clone(), input).await {
            Ok(req) => req,
            Err(e) => return self.fail(ctx, TransportError::Decode(e)),
        };

        let resp = match self.endpoint.call(ctx.clone(), req).await {
            Ok(resp) => resp,
            Err(e) => return self.fail(ctx, TransportError::Endpoint(e)),
        };

        if let Err(e) = self.encoder.encode(ctx, sink, resp) {
            return self.fail(ctx, TransportError::Encode(e));
        }

        Outcome::Done
    }

    fn fail(&self, ctx: &Context, err: TransportError) -> Outcome {
        self.error_handler.handle(ctx, &err);
        Outcome::Failed(err)
    }
}

impl<In, Sink, Req, Resp> Clone for Server<In, Sink, Req, Resp>
where
    In: Send + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
            decoder: Arc::clone(&self.decoder),
            encoder: Arc::clone(&self.encoder),
            error_handler: Arc::clone(&self.error_handler),
        }
    }
}
