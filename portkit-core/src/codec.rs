//! Pluggable request decoding and response encoding.
//!
//! Both seams are plain function values in the common case: any matching
//! `Fn` implements the trait, so swapping a codec never requires a new type.

use std::future::Future;

use async_trait::async_trait;

use crate::{BoxError, Context};

/// Turns a raw transport input into the endpoint's typed request.
///
/// Decoding may suspend (e.g. to read a request body). A failure means the
/// input was malformed and the endpoint must not run.
#[async_trait]
pub trait Decoder<In, Req>: Send + Sync
where
    In: Send + 'static,
    Req: Send + 'static,
{
    /// Build a new `Req` from `input`.
    ///
    /// # Errors
    /// Any error signals malformed input.
    async fn decode(&self, ctx: Context, input: In) -> Result<Req, BoxError>;
}

#[async_trait]
impl<F, Fut, In, Req> Decoder<In, Req> for F
where
    F: Fn(Context, In) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Req, BoxError>> + Send + 'static,
    In: Send + 'static,
    Req: Send + 'static,
{
    async fn decode(&self, ctx: Context, input: In) -> Result<Req, BoxError> {
        (self)(ctx, input).await
    }
}

/// Writes the endpoint's typed response onto a transport sink.
///
/// Encoding is synchronous: the response is already computed and the sink
/// is borrowed for the duration of the call. An encoder that fails before
/// writing must leave the sink untouched.
pub trait Encoder<Sink, Resp>: Send + Sync {
    /// Write `resp` to `sink`.
    ///
    /// # Errors
    /// Serialization failure, or a failed write to the sink.
    fn encode(&self, ctx: &Context, sink: &mut Sink, resp: Resp) -> Result<(), BoxError>;
}

impl<F, Sink, Resp> Encoder<Sink, Resp> for F
where
    F: Fn(&Context, &mut Sink, Resp) -> Result<(), BoxError> + Send + Sync,
{
    fn encode(&self, ctx: &Context, sink: &mut Sink, resp: Resp) -> Result<(), BoxError> {
        (self)(ctx, sink, resp)
    }
}
