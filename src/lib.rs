//! In-process mediator: typed commands, queries and notifications routed
//! through ordered interceptor pipelines.
//!
//! See [`mediator`] for the dispatch surface, [`pipeline`] for writing
//! interceptors and [`registry`] for registering handlers.

extern crate self as mediator_rs;

mod error;
mod handler;
pub mod mediator;
pub mod observability;
pub mod pipeline;
pub mod registry;
mod request;
pub mod validation;

pub use error::{ConfigError, DispatchError, DispatchResult};
pub use handler::{CommandHandler, NotificationHandler, QueryHandler};
pub use mediator::{
    Dispatcher, HandlerFailure, Mediator, MediatorBuilder, MediatorOptions, PublishFailure,
    PublishStrategy,
};
#[cfg(feature = "metrics")]
pub use observability::MetricsInterceptor;
pub use observability::{LoggingInterceptor, TracingInterceptor};
pub use pipeline::{Applicability, Interceptor, Next};
pub use registry::{construct, HandlerModule, Lifetime, Registrar, Registry, Services};
pub use request::{Command, Envelope, NoValue, Notification, Query, RequestKind, Response};
pub use validation::{
    Rules, ValidationError, ValidationErrors, ValidationFailure, ValidationOutcome, Validator,
};

// Derive macros share their names with the traits they implement.
pub use mediator_rs_macros::{Command, Notification, Query};

// Re-exported so handler and interceptor impls need no direct dependency.
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
