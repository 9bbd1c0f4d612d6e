//! Error types for configuration and dispatch.

use crate::mediator::PublishFailure;
use crate::request::{RequestKind, Response};
use crate::validation::ValidationFailure;

/// Result of running a pipeline stage.
pub type DispatchResult<T = Response> = Result<T, DispatchError>;

/// Failure of a `send`, `query` or `publish` call.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No handler is registered for the request type. A configuration defect.
    #[error("no {kind} handler registered for {request_type}")]
    Unregistered {
        kind: RequestKind,
        request_type: &'static str,
    },

    /// A factory asked for a collaborator that was never provided.
    #[error("missing service {service}")]
    MissingService { service: &'static str },

    /// One or more validators rejected the request. The handler did not run.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// One or more notification handlers failed.
    #[error(transparent)]
    Publish(#[from] PublishFailure),

    /// The cancellation token fired before the dispatch could continue.
    #[error("dispatch of {request_type} was cancelled")]
    Cancelled { request_type: &'static str },

    /// A pipeline stage produced a value of the wrong type.
    #[error("pipeline produced {found} where {expected} was expected")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Failure raised by a handler or interceptor, carried unmodified.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl DispatchError {
    /// Static name of the error class, suitable as a metric or span tag.
    pub fn category(&self) -> &'static str {
        match self {
            DispatchError::Unregistered { .. } => "unregistered",
            DispatchError::MissingService { .. } => "missing_service",
            DispatchError::Validation(_) => "validation",
            DispatchError::Publish(_) => "publish",
            DispatchError::Cancelled { .. } => "cancelled",
            DispatchError::TypeMismatch { .. } => "type_mismatch",
            DispatchError::Handler(_) => "handler",
        }
    }

    /// Type name of the failure, for span and log fields.
    ///
    /// Validation and publish failures report their payload type. Handler
    /// failures report `anyhow::Error`, which erases the concrete type; use
    /// `downcast_handler` to recover it.
    pub fn type_name(&self) -> &'static str {
        match self {
            DispatchError::Validation(_) => std::any::type_name::<ValidationFailure>(),
            DispatchError::Publish(_) => std::any::type_name::<PublishFailure>(),
            DispatchError::Handler(_) => std::any::type_name::<anyhow::Error>(),
            _ => std::any::type_name::<DispatchError>(),
        }
    }

    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            DispatchError::Validation(failure) => Some(failure),
            _ => None,
        }
    }

    /// Downcast a handler failure back to its original type.
    pub fn downcast_handler<E>(&self) -> Option<&E>
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        match self {
            DispatchError::Handler(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Errors detected while building a `Mediator`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A command or query type has more than one handler.
    #[error(
        "{kind} {request_type} already handled by {existing}; cannot also register {duplicate}"
    )]
    DuplicateHandler {
        kind: RequestKind,
        request_type: &'static str,
        existing: &'static str,
        duplicate: &'static str,
    },

    /// Options could not be parsed.
    #[error("invalid mediator options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
