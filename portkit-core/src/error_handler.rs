//! Failure policy hook invoked once per failed request.

use crate::{Context, Stage, TransportError};

/// Reacts to a pipeline failure with side effects (logging, metrics, ...).
///
/// Called at most once per request by whichever stage failed first. The
/// output sink may never have been touched, so implementations must not
/// assume anything about it. Must be safe to call concurrently.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, ctx: &Context, err: &TransportError);
}

impl<F> ErrorHandler for F
where
    F: Fn(&Context, &TransportError) + Send + Sync,
{
    fn handle(&self, ctx: &Context, err: &TransportError) {
        (self)(ctx, err);
    }
}

/// Logs every failure through `tracing`.
///
/// Decode failures are the caller's fault and log at `warn`; endpoint and
/// encode failures log at `error`. This is the handler servers get when
/// none is supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, ctx: &Context, err: &TransportError) {
        let stage = err.stage();
        match stage {
            Stage::Decode => tracing::warn!(
                request_id = %ctx.request_id(),
                %stage,
                error = %err.inner(),
                "rejected malformed request"
            ),
            Stage::Endpoint | Stage::Encode => tracing::error!(
                request_id = %ctx.request_id(),
                %stage,
                error = %err.inner(),
                "request failed"
            ),
        }
    }
}

/// Drops every failure without side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopErrorHandler;

impl ErrorHandler for NopErrorHandler {
    fn handle(&self, _ctx: &Context, _err: &TransportError) {}
}
