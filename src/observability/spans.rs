use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::field::Empty;
use tracing::Instrument;

use crate::error::DispatchResult;
use crate::pipeline::{Interceptor, Next};
use crate::request::Envelope;

/// Name of the span opened around each dispatch.
pub const DISPATCH_SPAN: &str = "mediator.dispatch";

/// Wraps each dispatch in an `info` span named `mediator.dispatch`.
///
/// Fields: `request.kind`, `request.type`, then on exit
/// `otel.status_code` (`OK`/`ERROR`) and `duration_ms`; failures add
/// `error.type` (see [`DispatchError::type_name`]), `error.kind` (the
/// category) and `error.message`. The result or failure is returned
/// unchanged.
///
/// [`DispatchError::type_name`]: crate::DispatchError::type_name
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInterceptor;

#[async_trait]
impl Interceptor for TracingInterceptor {
    async fn intercept(
        &self,
        request: Envelope,
        cancel: CancellationToken,
        next: Next,
    ) -> DispatchResult {
        let span = tracing::info_span!(
            "mediator.dispatch",
            "request.kind" = request.kind().as_str(),
            "request.type" = request.type_name(),
            "otel.status_code" = Empty,
            duration_ms = Empty,
            "error.type" = Empty,
            "error.kind" = Empty,
            "error.message" = Empty
        );
        if span.is_disabled() {
            return next.run(request, cancel).await;
        }

        let started = Instant::now();
        let result = next.run(request, cancel).instrument(span.clone()).await;
        span.record("duration_ms", started.elapsed().as_secs_f64() * 1000.0);

        match &result {
            Ok(_) => {
                span.record("otel.status_code", "OK");
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.type", err.type_name());
                span.record("error.kind", err.category());
                span.record("error.message", tracing::field::display(err));
            }
        }
        result
    }
}
