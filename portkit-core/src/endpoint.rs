//! The business-logic seam at the centre of the pipeline.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::Context;

/// Boxed error type returned by endpoints and codecs.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Transport-agnostic business logic: one typed request in, one typed
/// response (or an error) out.
///
/// Any `Fn(Context, Req) -> impl Future<Output = Result<Resp, BoxError>>`
/// is an endpoint, so plain `async fn`s can be passed directly.
///
/// Implementations must be `Send + Sync`: a single endpoint serves many
/// requests concurrently. The pipeline imposes no timeout or retry.
#[async_trait]
pub trait Endpoint<Req, Resp>: Send + Sync
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Run the business logic for one request.
    ///
    /// # Errors
    /// Whatever the domain defines. The error reaches the server's
    /// [`ErrorHandler`](crate::ErrorHandler) wrapped in
    /// [`TransportError::Endpoint`](crate::TransportError::Endpoint).
    async fn call(&self, ctx: Context, req: Req) -> Result<Resp, BoxError>;
}

#[async_trait]
impl<F, Fut, Req, Resp> Endpoint<Req, Resp> for F
where
    F: Fn(Context, Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resp, BoxError>> + Send + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    async fn call(&self, ctx: Context, req: Req) -> Result<Resp, BoxError> {
        (self)(ctx, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn double(_ctx: Context, n: u32) -> Result<u32, BoxError> {
        Ok(n * 2)
    }

    struct Fixed(&'static str);

    #[async_trait]
    impl Endpoint<(), String> for Fixed {
        async fn call(&self, _ctx: Context, _req: ()) -> Result<String, BoxError> {
            Ok(self.0.to_owned())
        }
    }

    #[tokio::test]
    async fn async_fn_is_an_endpoint() {
        let result = Endpoint::<u32, u32>::call(&double, Context::new(), 21).await;
        assert!(matches!(result, Ok(42)), "expected Ok(42), got {result:?}");
    }

    #[tokio::test]
    async fn endpoint_usable_as_trait_object() {
        let e: Box<dyn Endpoint<(), String>> = Box::new(Fixed("pong"));
        let out = match e.call(Context::new(), ()).await {
            Ok(s) => s,
            Err(err) => panic!("unexpected error: {err}"),
        };
        assert_eq!(out, "pong");
    }
}
