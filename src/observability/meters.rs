use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchResult;
use crate::pipeline::{Interceptor, Next};
use crate::request::Envelope;

/// Counter labelled `kind`, `request`, `status` (`ok` or `error`).
pub const REQUESTS_TOTAL: &str = "mediator_requests_total";
/// Counter labelled `kind`, `request`, `error` (the error category).
pub const REQUEST_ERRORS_TOTAL: &str = "mediator_request_errors_total";
/// Histogram in seconds labelled `kind`, `request`.
pub const REQUEST_DURATION_SECONDS: &str = "mediator_request_duration_seconds";

/// Records request counts and durations through the `metrics` facade.
///
/// Install any `metrics` recorder (e.g. a Prometheus exporter) to collect
/// them; without one every call is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsInterceptor;

#[async_trait]
impl Interceptor for MetricsInterceptor {
    async fn intercept(
        &self,
        request: Envelope,
        cancel: CancellationToken,
        next: Next,
    ) -> DispatchResult {
        let kind = request.kind().as_str();
        let request_type = request.type_name();
        let started = Instant::now();

        let result = next.run(request, cancel).await;

        let status = match &result {
            Ok(_) => "ok",
            Err(err) => {
                metrics::counter!(
                    REQUEST_ERRORS_TOTAL,
                    "kind" => kind,
                    "request" => request_type,
                    "error" => err.category()
                )
                .increment(1);
                "error"
            }
        };
        metrics::counter!(
            REQUESTS_TOTAL,
            "kind" => kind,
            "request" => request_type,
            "status" => status
        )
        .increment(1);
        metrics::histogram!(
            REQUEST_DURATION_SECONDS,
            "kind" => kind,
            "request" => request_type
        )
        .record(started.elapsed().as_secs_f64());

        result
    }
}
