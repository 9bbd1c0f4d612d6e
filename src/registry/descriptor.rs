//! Registry entries.
//!
//! A descriptor records what was registered (request type, implementation
//! type, lifetime) and knows how to resolve an instance and adapt it to the
//! type-erased shape the pipeline runs. Descriptors are built once during
//! configuration and never change afterwards.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::lifetime::{Factory, Lifetime, RegistrationId, Resolver};
use crate::error::{DispatchError, DispatchResult};
use crate::handler::{CommandHandler, NotificationHandler, QueryHandler};
use crate::pipeline::{Applicability, Interceptor, Stage, StageFuture};
use crate::request::{Command, Envelope, Notification, Query, RequestKind, Response};
use crate::validation::{ErasedValidator, Validator, ValidatorAdapter};

type BindResult<T> = Result<T, DispatchError>;
type Bind<T> = Arc<dyn Fn(&Resolver<'_>) -> BindResult<T> + Send + Sync>;

// =============================================================================
// Command / query handlers
// =============================================================================

/// Binds a command or query type to its single handler.
pub struct HandlerDescriptor {
    kind: RequestKind,
    request_type: TypeId,
    request_name: &'static str,
    result_name: &'static str,
    implementation: &'static str,
    implementation_type: TypeId,
    lifetime: Lifetime,
    bind: Bind<Stage>,
}

impl HandlerDescriptor {
    pub(crate) fn command<C, H>(lifetime: Lifetime, factory: Factory<H>) -> Self
    where
        C: Command,
        H: CommandHandler<C>,
    {
        let registration = RegistrationId::next();
        let bind = move |resolver: &Resolver<'_>| -> BindResult<Stage> {
            let handler = resolver.resolve(registration, lifetime, &factory)?;
            let stage: Stage = Arc::new(
                move |request: Envelope, cancel: CancellationToken| -> StageFuture {
                    let handler = handler.clone();
                    Box::pin(async move {
                        let command = unwrap_request::<C>(request)?;
                        let output =
                            CommandHandler::<C>::handle(&*handler, command, &cancel).await?;
                        Ok(Response::new(output))
                    })
                },
            );
            Ok(stage)
        };

        Self {
            kind: RequestKind::Command,
            request_type: TypeId::of::<C>(),
            request_name: std::any::type_name::<C>(),
            result_name: std::any::type_name::<C::Output>(),
            implementation: std::any::type_name::<H>(),
            implementation_type: TypeId::of::<H>(),
            lifetime,
            bind: Arc::new(bind),
        }
    }

    pub(crate) fn query<Q, H>(lifetime: Lifetime, factory: Factory<H>) -> Self
    where
        Q: Query,
        H: QueryHandler<Q>,
    {
        let registration = RegistrationId::next();
        let bind = move |resolver: &Resolver<'_>| -> BindResult<Stage> {
            let handler = resolver.resolve(registration, lifetime, &factory)?;
            let stage: Stage = Arc::new(
                move |request: Envelope, cancel: CancellationToken| -> StageFuture {
                    let handler = handler.clone();
                    Box::pin(async move {
                        let query = unwrap_request::<Q>(request)?;
                        let output =
                            QueryHandler::<Q>::handle(&*handler, query, &cancel).await?;
                        Ok(Response::new(output))
                    })
                },
            );
            Ok(stage)
        };

        Self {
            kind: RequestKind::Query,
            request_type: TypeId::of::<Q>(),
            request_name: std::any::type_name::<Q>(),
            result_name: std::any::type_name::<Q::Output>(),
            implementation: std::any::type_name::<H>(),
            implementation_type: TypeId::of::<H>(),
            lifetime,
            bind: Arc::new(bind),
        }
    }

    /// Resolve the handler instance and wrap it as the innermost stage.
    pub(crate) fn bind(&self, resolver: &Resolver<'_>) -> BindResult<Stage> {
        (self.bind)(resolver)
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn request_type(&self) -> TypeId {
        self.request_type
    }

    pub fn request_name(&self) -> &'static str {
        self.request_name
    }

    pub fn result_name(&self) -> &'static str {
        self.result_name
    }

    /// Type name of the handler implementation.
    pub fn implementation(&self) -> &'static str {
        self.implementation
    }

    pub fn implementation_type(&self) -> TypeId {
        self.implementation_type
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("kind", &self.kind)
            .field("request", &self.request_name)
            .field("result", &self.result_name)
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

fn unwrap_request<T: 'static>(request: Envelope) -> Result<T, DispatchError> {
    request
        .into_inner::<T>()
        .map_err(|request| DispatchError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found: request.type_name(),
        })
}

// =============================================================================
// Notification handlers
// =============================================================================

/// Notification handler with its notification type erased.
#[async_trait]
pub(crate) trait ErasedNotificationHandler: Send + Sync {
    async fn handle(
        &self,
        notification: &(dyn Any + Send + Sync),
        cancel: &CancellationToken,
    ) -> DispatchResult<()>;
}

struct NotificationAdapter<N, H> {
    handler: Arc<H>,
    _notification: PhantomData<fn(&N)>,
}

#[async_trait]
impl<N, H> ErasedNotificationHandler for NotificationAdapter<N, H>
where
    N: Notification,
    H: NotificationHandler<N>,
{
    async fn handle(
        &self,
        notification: &(dyn Any + Send + Sync),
        cancel: &CancellationToken,
    ) -> DispatchResult<()> {
        let Some(notification) = notification.downcast_ref::<N>() else {
            return Err(DispatchError::TypeMismatch {
                expected: std::any::type_name::<N>(),
                found: "unknown notification",
            });
        };
        NotificationHandler::<N>::handle(&*self.handler, notification, cancel).await?;
        Ok(())
    }
}

pub(crate) type ErasedNotification = Arc<dyn ErasedNotificationHandler>;

/// One of the handlers registered for a notification type.
pub struct NotificationDescriptor {
    request_type: TypeId,
    request_name: &'static str,
    implementation: &'static str,
    lifetime: Lifetime,
    bind: Bind<ErasedNotification>,
}

impl NotificationDescriptor {
    pub(crate) fn new<N, H>(lifetime: Lifetime, factory: Factory<H>) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        let registration = RegistrationId::next();
        let bind = move |resolver: &Resolver<'_>| -> BindResult<ErasedNotification> {
            let handler = resolver.resolve(registration, lifetime, &factory)?;
            let adapter: ErasedNotification = Arc::new(NotificationAdapter::<N, H> {
                handler,
                _notification: PhantomData,
            });
            Ok(adapter)
        };

        Self {
            request_type: TypeId::of::<N>(),
            request_name: std::any::type_name::<N>(),
            implementation: std::any::type_name::<H>(),
            lifetime,
            bind: Arc::new(bind),
        }
    }

    pub(crate) fn bind(&self, resolver: &Resolver<'_>) -> BindResult<ErasedNotification> {
        (self.bind)(resolver)
    }

    pub fn request_type(&self) -> TypeId {
        self.request_type
    }

    pub fn request_name(&self) -> &'static str {
        self.request_name
    }

    pub fn implementation(&self) -> &'static str {
        self.implementation
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

impl fmt::Debug for NotificationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDescriptor")
            .field("notification", &self.request_name)
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

// =============================================================================
// Validators
// =============================================================================

/// A validator registered for a request type.
pub struct ValidatorDescriptor {
    request_type: TypeId,
    request_name: &'static str,
    implementation: &'static str,
    lifetime: Lifetime,
    bind: Bind<Arc<dyn ErasedValidator>>,
}

impl ValidatorDescriptor {
    pub(crate) fn new<T, V>(lifetime: Lifetime, factory: Factory<V>) -> Self
    where
        T: Send + Sync + 'static,
        V: Validator<T>,
    {
        let registration = RegistrationId::next();
        let bind = move |resolver: &Resolver<'_>| -> BindResult<Arc<dyn ErasedValidator>> {
            let validator = resolver.resolve(registration, lifetime, &factory)?;
            Ok(Arc::new(ValidatorAdapter::<T, V>::new(validator)))
        };

        Self {
            request_type: TypeId::of::<T>(),
            request_name: std::any::type_name::<T>(),
            implementation: std::any::type_name::<V>(),
            lifetime,
            bind: Arc::new(bind),
        }
    }

    pub(crate) fn bind(&self, resolver: &Resolver<'_>) -> BindResult<Arc<dyn ErasedValidator>> {
        (self.bind)(resolver)
    }

    pub fn request_type(&self) -> TypeId {
        self.request_type
    }

    pub fn request_name(&self) -> &'static str {
        self.request_name
    }

    pub fn implementation(&self) -> &'static str {
        self.implementation
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

impl fmt::Debug for ValidatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorDescriptor")
            .field("request", &self.request_name)
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

// =============================================================================
// Interceptors
// =============================================================================

/// An interceptor type, its applicability and its position in the chain.
///
/// `index` is the registration order and the only ordering key; no two
/// interceptors share one.
pub struct InterceptorDescriptor {
    implementation: &'static str,
    implementation_type: TypeId,
    applicability: Applicability,
    index: usize,
    lifetime: Lifetime,
    bind: Bind<Arc<dyn Interceptor>>,
}

impl InterceptorDescriptor {
    pub(crate) fn new<I: Interceptor>(
        applicability: Applicability,
        index: usize,
        lifetime: Lifetime,
        factory: Factory<I>,
    ) -> Self {
        let registration = RegistrationId::next();
        let bind = move |resolver: &Resolver<'_>| -> BindResult<Arc<dyn Interceptor>> {
            let interceptor: Arc<I> = resolver.resolve(registration, lifetime, &factory)?;
            Ok(interceptor)
        };

        Self {
            implementation: std::any::type_name::<I>(),
            implementation_type: TypeId::of::<I>(),
            applicability,
            index,
            lifetime,
            bind: Arc::new(bind),
        }
    }

    pub(crate) fn bind(&self, resolver: &Resolver<'_>) -> BindResult<Arc<dyn Interceptor>> {
        (self.bind)(resolver)
    }

    pub fn implementation(&self) -> &'static str {
        self.implementation
    }

    pub fn implementation_type(&self) -> TypeId {
        self.implementation_type
    }

    pub fn applicability(&self) -> Applicability {
        self.applicability
    }

    /// Registration order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

impl fmt::Debug for InterceptorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorDescriptor")
            .field("index", &self.index)
            .field("implementation", &self.implementation)
            .field("applicability", &self.applicability)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
