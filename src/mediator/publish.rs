//! Notification fan-out.
//!
//! Notifications skip the interceptor pipeline and the validation gate. Every
//! handler registered for the exact notification type runs once, one after
//! another, in registration order.

use std::fmt;
use tokio_util::sync::CancellationToken;

use super::options::PublishStrategy;
use crate::error::{DispatchError, DispatchResult};
use crate::registry::{ErasedNotification, NotificationDescriptor, Resolver};
use crate::request::Notification;

/// A notification handler that failed during `publish`.
#[derive(Debug)]
pub struct HandlerFailure {
    handler: &'static str,
    error: DispatchError,
}

impl HandlerFailure {
    pub fn handler(&self) -> &'static str {
        self.handler
    }

    pub fn error(&self) -> &DispatchError {
        &self.error
    }

    pub fn into_error(self) -> DispatchError {
        self.error
    }
}

/// One or more notification handlers failed.
///
/// When the caller cancels after a handler has already failed, the failures
/// are still reported here and `cancelled` is set; the remaining handlers
/// did not run.
#[derive(Debug)]
pub struct PublishFailure {
    notification: &'static str,
    attempted: usize,
    cancelled: bool,
    failures: Vec<HandlerFailure>,
}

impl PublishFailure {
    pub fn notification(&self) -> &'static str {
        self.notification
    }

    /// Handlers that ran, including the failed ones.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Whether cancellation stopped the fan-out before every handler ran.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Failures in the order the handlers ran.
    pub fn failures(&self) -> &[HandlerFailure] {
        &self.failures
    }
}

impl fmt::Display for PublishFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} handler(s) for {} failed",
            self.failures.len(),
            self.attempted,
            self.notification
        )?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.handler, failure.error)?;
        }
        if self.cancelled {
            write!(f, "; cancelled before the remaining handlers ran")?;
        }
        Ok(())
    }
}

impl std::error::Error for PublishFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|failure| &failure.error as &(dyn std::error::Error + 'static))
    }
}

pub(crate) async fn fan_out<N: Notification>(
    descriptors: &[NotificationDescriptor],
    resolver: &Resolver<'_>,
    notification: &N,
    cancel: &CancellationToken,
    strategy: PublishStrategy,
) -> DispatchResult<()> {
    let notification_type = std::any::type_name::<N>();
    if descriptors.is_empty() {
        tracing::debug!(notification = notification_type, "no notification handlers registered");
        return Ok(());
    }

    // Resolve everything first so a configuration defect runs no handler at all.
    let handlers = descriptors
        .iter()
        .map(|descriptor| {
            descriptor
                .bind(resolver)
                .map(|handler| (descriptor.implementation(), handler))
        })
        .collect::<Result<Vec<(&'static str, ErasedNotification)>, DispatchError>>()?;

    let mut failures = Vec::new();
    let mut attempted = 0;
    let mut cancelled = false;

    for (name, handler) in handlers {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        attempted += 1;
        if let Err(error) = handler.handle(notification, cancel).await {
            tracing::debug!(
                notification = notification_type,
                handler = name,
                error = %error,
                "notification handler failed"
            );
            failures.push(HandlerFailure {
                handler: name,
                error,
            });
            if strategy == PublishStrategy::StopOnFirstError {
                break;
            }
        }
    }

    match (failures.is_empty(), cancelled) {
        (true, false) => Ok(()),
        (true, true) => Err(DispatchError::Cancelled {
            request_type: notification_type,
        }),
        (false, _) => Err(PublishFailure {
            notification: notification_type,
            attempted,
            cancelled,
            failures,
        }
        .into()),
    }
}
