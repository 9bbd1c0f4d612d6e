use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::ValidationOutcome;
use crate::error::{DispatchError, DispatchResult};
use crate::request::Envelope;

/// Checks a request before its handler runs.
///
/// Several validators may target the same request type; the validation gate
/// runs all of them and reports every error they produce.
///
/// ```ignore
/// struct TitleRequired;
///
/// #[async_trait]
/// impl Validator<CreateTodo> for TitleRequired {
///     async fn validate(&self, cmd: &CreateTodo, _: &CancellationToken) -> ValidationOutcome {
///         let mut rules = Rules::new();
///         rules.check(!cmd.title.trim().is_empty(), "title", "Title is required");
///         rules.into_outcome()
///     }
/// }
/// ```
#[async_trait]
pub trait Validator<T: Send + Sync + 'static>: Send + Sync + 'static {
    async fn validate(&self, request: &T, cancel: &CancellationToken) -> ValidationOutcome;
}

/// Validator with its request type erased.
#[async_trait]
pub(crate) trait ErasedValidator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn validate(
        &self,
        request: &Envelope,
        cancel: &CancellationToken,
    ) -> DispatchResult<ValidationOutcome>;
}

pub(crate) struct ValidatorAdapter<T, V> {
    validator: Arc<V>,
    _request: PhantomData<fn(&T)>,
}

impl<T, V> ValidatorAdapter<T, V> {
    pub(crate) fn new(validator: Arc<V>) -> Self {
        Self {
            validator,
            _request: PhantomData,
        }
    }
}

#[async_trait]
impl<T, V> ErasedValidator for ValidatorAdapter<T, V>
where
    T: Send + Sync + 'static,
    V: Validator<T>,
{
    fn name(&self) -> &'static str {
        std::any::type_name::<V>()
    }

    async fn validate(
        &self,
        request: &Envelope,
        cancel: &CancellationToken,
    ) -> DispatchResult<ValidationOutcome> {
        let typed = request
            .downcast_ref::<T>()
            .ok_or(DispatchError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: request.type_name(),
            })?;
        Ok(Validator::<T>::validate(&*self.validator, typed, cancel).await)
    }
}
