use std::sync::Arc;

use super::descriptor::{HandlerDescriptor, NotificationDescriptor, ValidatorDescriptor};
use super::lifetime::Lifetime;
use super::services::Services;
use super::RegistryBuilder;
use crate::error::DispatchError;
use crate::handler::{CommandHandler, NotificationHandler, QueryHandler};
use crate::request::{Command, Notification, Query};
use crate::validation::Validator;

/// Registers the handlers and validators of one module.
///
/// Every registration made through a `Registrar` gets the lifetime chosen
/// when the module was added. One implementation type may be registered
/// under several contracts; each registration is an independent descriptor
/// with its own scoped or singleton instance.
pub struct Registrar<'a> {
    registry: &'a mut RegistryBuilder,
    lifetime: Lifetime,
}

impl<'a> Registrar<'a> {
    pub(crate) fn new(registry: &'a mut RegistryBuilder, lifetime: Lifetime) -> Self {
        Self { registry, lifetime }
    }

    /// Lifetime applied to this module's registrations.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Register the handler for command `C`.
    pub fn command<C, H, F>(&mut self, factory: F) -> &mut Self
    where
        C: Command,
        H: CommandHandler<C>,
        F: Fn(&Services) -> Result<H, DispatchError> + Send + Sync + 'static,
    {
        let descriptor = HandlerDescriptor::command::<C, H>(self.lifetime, Arc::new(factory));
        tracing::debug!(
            request = descriptor.request_name(),
            handler = descriptor.implementation(),
            lifetime = ?self.lifetime,
            "registered command handler"
        );
        self.registry.handlers.push(descriptor);
        self
    }

    /// Register the handler for query `Q`.
    pub fn query<Q, H, F>(&mut self, factory: F) -> &mut Self
    where
        Q: Query,
        H: QueryHandler<Q>,
        F: Fn(&Services) -> Result<H, DispatchError> + Send + Sync + 'static,
    {
        let descriptor = HandlerDescriptor::query::<Q, H>(self.lifetime, Arc::new(factory));
        tracing::debug!(
            request = descriptor.request_name(),
            handler = descriptor.implementation(),
            lifetime = ?self.lifetime,
            "registered query handler"
        );
        self.registry.handlers.push(descriptor);
        self
    }

    /// Add a handler for notification `N`.
    pub fn notification<N, H, F>(&mut self, factory: F) -> &mut Self
    where
        N: Notification,
        H: NotificationHandler<N>,
        F: Fn(&Services) -> Result<H, DispatchError> + Send + Sync + 'static,
    {
        let descriptor = NotificationDescriptor::new::<N, H>(self.lifetime, Arc::new(factory));
        tracing::debug!(
            notification = descriptor.request_name(),
            handler = descriptor.implementation(),
            "registered notification handler"
        );
        self.registry.notifications.push(descriptor);
        self
    }

    /// Add a validator for request type `T`.
    pub fn validator<T, V, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        V: Validator<T>,
        F: Fn(&Services) -> Result<V, DispatchError> + Send + Sync + 'static,
    {
        let descriptor = ValidatorDescriptor::new::<T, V>(self.lifetime, Arc::new(factory));
        tracing::debug!(
            request = descriptor.request_name(),
            validator = descriptor.implementation(),
            "registered validator"
        );
        self.registry.validators.push(descriptor);
        self
    }
}

/// Factory for types with no collaborators.
///
/// ```ignore
/// r.command::<Ping, _, _>(construct::<PingHandler>);
/// ```
pub fn construct<T: Default>(_: &Services) -> Result<T, DispatchError> {
    Ok(T::default())
}

/// A unit of handler registrations, e.g. one feature module.
pub trait HandlerModule {
    fn register(&self, registrar: &mut Registrar<'_>);
}

impl<F> HandlerModule for F
where
    F: Fn(&mut Registrar<'_>),
{
    fn register(&self, registrar: &mut Registrar<'_>) {
        self(registrar)
    }
}

/// Register handler modules with a `MediatorBuilder` using the module convention.
///
/// Each module must export `pub fn register(r: &mut Registrar<'_>)`.
///
/// # Example
/// ```ignore
/// let mediator = mediator_rs::register_handlers!(
///     Mediator::builder(),
///     handlers::todos,
///     handlers::audit,
/// )
/// .build()?;
/// ```
#[macro_export]
macro_rules! register_handlers {
    ($builder:expr, $( $($seg:ident)::+ ),+ $(,)?) => {
        $builder
        $(
            .handlers($($seg)::+::register)
        )+
    };
}
