use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::validator::ErasedValidator;
use super::{ValidationErrors, ValidationFailure, ValidationOutcome};
use crate::error::{DispatchError, DispatchResult};
use crate::pipeline::{Interceptor, Next};
use crate::request::Envelope;

/// Innermost interceptor when validation is enabled.
///
/// Runs the request's validators one after another in registration order,
/// collecting every error. Any error stops the dispatch before the handler.
pub(crate) struct ValidationGate {
    validators: Vec<Arc<dyn ErasedValidator>>,
}

impl ValidationGate {
    pub(crate) fn new(validators: Vec<Arc<dyn ErasedValidator>>) -> Self {
        Self { validators }
    }
}

#[async_trait]
impl Interceptor for ValidationGate {
    async fn intercept(
        &self,
        request: Envelope,
        cancel: CancellationToken,
        next: Next,
    ) -> DispatchResult {
        let mut errors = Vec::new();

        for validator in &self.validators {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled {
                    request_type: request.type_name(),
                });
            }

            let outcome = validator.validate(&request, &cancel).await?;
            if let ValidationOutcome::Invalid(found) = outcome {
                tracing::debug!(
                    request = request.type_name(),
                    validator = validator.name(),
                    errors = found.len(),
                    "validator rejected request"
                );
                errors.extend(found);
            }
        }

        if let Some(errors) = ValidationErrors::from_vec(errors) {
            return Err(ValidationFailure::new(request.type_name(), errors).into());
        }

        next.run(request, cancel).await
    }
}
