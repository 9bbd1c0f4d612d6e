//! Built-in observability interceptors.
//!
//! Register them like any other interceptor; position in the chain decides
//! what they measure (registered first, they time the whole pipeline).
//!
//! ```ignore
//! Mediator::builder()
//!     .add_interceptor::<TracingInterceptor>(Applicability::All)
//!     .add_interceptor::<MetricsInterceptor>(Applicability::All)
//! ```
//!
//! With no subscriber or recorder installed they pass requests and results
//! through untouched.

mod logging;
#[cfg(feature = "metrics")]
mod meters;
mod spans;

pub use logging::LoggingInterceptor;
#[cfg(feature = "metrics")]
pub use meters::{
    MetricsInterceptor, REQUESTS_TOTAL, REQUEST_DURATION_SECONDS, REQUEST_ERRORS_TOTAL,
};
pub use spans::{TracingInterceptor, DISPATCH_SPAN};
