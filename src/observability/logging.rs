use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchResult;
use crate::pipeline::{Interceptor, Next};
use crate::request::Envelope;

/// Logs each dispatch as `tracing` events.
///
/// `debug` on entry and on success, `warn` on failure. The failure is
/// returned unchanged; logging it is the only thing this interceptor adds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInterceptor;

#[async_trait]
impl Interceptor for LoggingInterceptor {
    async fn intercept(
        &self,
        request: Envelope,
        cancel: CancellationToken,
        next: Next,
    ) -> DispatchResult {
        let kind = request.kind();
        let request_type = request.type_name();
        tracing::debug!(kind = %kind, request = request_type, "handling request");

        let started = Instant::now();
        let result = next.run(request, cancel).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(_) => tracing::debug!(
                kind = %kind,
                request = request_type,
                elapsed_ms,
                "request handled"
            ),
            Err(err) => tracing::warn!(
                kind = %kind,
                request = request_type,
                elapsed_ms,
                error_kind = err.category(),
                error = %err,
                "request failed"
            ),
        }
        result
    }
}
