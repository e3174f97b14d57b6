//! [`HttpServer`]: the pipeline mounted as a `tower` service.

use std::{
    convert::Infallible,
    sync::Arc,
    task::{self, Poll},
};

use axum::{body::Body, extract::Request, response::Response};
use http_body_util::Limited;
use portkit_core::{
    BoxFuture, Context, Decoder, Encoder, Endpoint, ErrorHandler, LogErrorHandler, Outcome,
    RequestId, Server,
};
use serde::{de::DeserializeOwned, Serialize};
use tower::Service;
use uuid::Uuid;

use crate::{decode_request, encode_json_response, ErrorEncoder, HttpConfig, NopErrorEncoder, ResponseSink};

/// Header carrying a caller-supplied request ID. Values that are not a UUID
/// are ignored and a fresh ID is generated.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// An endpoint bound to an HTTP decoder and encoder.
///
/// Implements `tower::Service<Request>`, so it mounts on an axum `Router`
/// with `route_service` or the `*_service` method routers:
///
/// ```ignore
/// let app = Router::new().route("/items/{id}", get_service(new_endpoint(get_item)));
/// ```
///
/// Per request the server builds a [`Context`], runs the core pipeline into
/// a fresh [`ResponseSink`], and on failure lets the [`ErrorEncoder`] render
/// the error after the [`ErrorHandler`] has seen it. The default encoder
/// writes nothing; install [`JsonErrorEncoder`](crate::JsonErrorEncoder)
/// with [`HttpServer::with_error_encoder`] for JSON error responses.
pub struct HttpServer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pipeline: Server<Request, ResponseSink, Req, Resp>,
    error_encoder: Arc<dyn ErrorEncoder>,
    config: HttpConfig,
}

impl<Req, Resp> HttpServer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Bind an endpoint to an arbitrary decoder and encoder.
    ///
    /// Failures are logged by [`LogErrorHandler`] and leave the response
    /// untouched ([`NopErrorEncoder`]) until replaced.
    #[must_use]
    pub fn new<E, D, C>(endpoint: E, decoder: D, encoder: C) -> Self
    where
        E: Endpoint<Req, Resp> + 'static,
        D: Decoder<Request, Req> + 'static,
        C: Encoder<ResponseSink, Resp> + 'static,
    {
        Self {
            pipeline: Server::new(endpoint, decoder, encoder, LogErrorHandler),
            error_encoder: Arc::new(NopErrorEncoder),
            config: HttpConfig::default(),
        }
    }

    #[must_use]
    pub fn with_error_handler<H: ErrorHandler + 'static>(mut self, error_handler: H) -> Self {
        self.pipeline = self.pipeline.with_error_handler(error_handler);
        self
    }

    /// Use one error handler instance across several servers.
    #[must_use]
    pub fn with_shared_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.pipeline = self.pipeline.with_shared_error_handler(error_handler);
        self
    }

    #[must_use]
    pub fn with_error_encoder<R: ErrorEncoder + 'static>(mut self, error_encoder: R) -> Self {
        self.error_encoder = Arc::new(error_encoder);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Handle one request.
    pub async fn serve(&self, req: Request) -> Response {
        let ctx = self.context_for(&req);
        let max_body_bytes = self.config.max_body_bytes;
        let req = req.map(|body| Body::new(Limited::new(body, max_body_bytes)));

        let mut sink = ResponseSink::with_limit(self.config.max_response_bytes);
        if let Outcome::Failed(err) = self.pipeline.serve(&ctx, req, &mut sink).await {
            self.error_encoder.encode_error(&ctx, &err, &mut sink);
        }
        sink.into_response()
    }

    fn context_for(&self, req: &Request) -> Context {
        let mut ctx = Context::new();
        let propagated = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok());
        if let Some(id) = propagated {
            ctx = ctx.with_request_id(RequestId::from(id));
        }
        if let Some(timeout) = self.config.request_timeout {
            ctx = ctx.with_timeout(timeout);
        }
        ctx
    }
}

impl<Req, Resp> Clone for HttpServer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            error_encoder: Arc::clone(&self.error_encoder),
            config: self.config.clone(),
        }
    }
}

impl<Req, Resp> Service<Request> for HttpServer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let server = self.clone();
        Box::pin(async move { Ok(server.serve(req).await) })
    }
}

/// Full construction: explicit endpoint, decoder and encoder.
#[must_use]
pub fn new_server<Req, Resp, E, D, C>(endpoint: E, decoder: D, encoder: C) -> HttpServer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: Endpoint<Req, Resp> + 'static,
    D: Decoder<Request, Req> + 'static,
    C: Encoder<ResponseSink, Resp> + 'static,
{
    HttpServer::new(endpoint, decoder, encoder)
}

/// Convenience construction: the endpoint plus the reference path/JSON
/// decoder and JSON encoder.
#[must_use]
pub fn new_endpoint<Req, Resp, E>(endpoint: E) -> HttpServer<Req, Resp>
where
    Req: DeserializeOwned + Send + 'static,
    Resp: Serialize + Send + 'static,
    E: Endpoint<Req, Resp> + 'static,
{
    HttpServer::new(endpoint, decode_request::<Req>, encode_json_response::<Resp>)
}
