use std::sync::Arc;

use super::dispatcher::Mediator;
use super::options::MediatorOptions;
use crate::error::{ConfigError, DispatchError};
use crate::pipeline::{Applicability, Interceptor};
use crate::registry::{
    HandlerModule, InterceptorDescriptor, Lifetime, Registrar, RegistryBuilder, Services,
};

/// Configures and builds a [`Mediator`].
///
/// Registration calls are additive and run in the order they are made.
/// `handlers` uses the default lifetime from the options in effect at the
/// time of the call, so set options first.
///
/// ```ignore
/// let mediator = Mediator::builder()
///     .options(MediatorOptions::from_json_str(&config)?)
///     .service(TodoStore::default())
///     .handlers(todos::register)
///     .add_interceptor::<TracingInterceptor>(Applicability::All)
///     .add_interceptor::<AuditInterceptor>(Applicability::CommandOnly)
///     .enable_validation()
///     .build()?;
/// ```
#[derive(Default)]
pub struct MediatorBuilder {
    registry: RegistryBuilder,
    options: MediatorOptions,
    services: Services,
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the options.
    ///
    /// `validation` is merged rather than replaced: once switched on, by
    /// `enable_validation` or an earlier `options` call, it stays on.
    pub fn options(mut self, options: MediatorOptions) -> Self {
        let validation = self.options.validation || options.validation;
        self.options = MediatorOptions {
            validation,
            ..options
        };
        self
    }

    /// Insert the validation gate into every command and query pipeline.
    pub fn enable_validation(mut self) -> Self {
        self.options.validation = true;
        self
    }

    /// Add an application-wide collaborator for factories.
    pub fn service<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.services.insert(value);
        self
    }

    /// Replace the application-wide collaborators.
    pub fn services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    /// Register a module's handlers and validators with the default lifetime.
    pub fn handlers<M: HandlerModule>(self, module: M) -> Self {
        let lifetime = self.options.default_lifetime;
        self.handlers_with(module, lifetime)
    }

    /// Register a module's handlers and validators with `lifetime`.
    pub fn handlers_with<M: HandlerModule>(mut self, module: M, lifetime: Lifetime) -> Self {
        module.register(&mut Registrar::new(&mut self.registry, lifetime));
        self
    }

    /// Append an interceptor built with `Default`, one instance per dispatch.
    pub fn add_interceptor<I>(self, applicability: Applicability) -> Self
    where
        I: Interceptor + Default,
    {
        self.add_interceptor_with(applicability, Lifetime::Transient, |_: &Services| {
            Ok(I::default())
        })
    }

    /// Append an interceptor built by `factory`.
    ///
    /// Interceptors wrap the handler in the order they are added; the first
    /// one added is outermost.
    pub fn add_interceptor_with<I, F>(
        mut self,
        applicability: Applicability,
        lifetime: Lifetime,
        factory: F,
    ) -> Self
    where
        I: Interceptor,
        F: Fn(&Services) -> Result<I, DispatchError> + Send + Sync + 'static,
    {
        let index = self.registry.interceptors.len();
        let descriptor =
            InterceptorDescriptor::new::<I>(applicability, index, lifetime, Arc::new(factory));
        tracing::debug!(
            interceptor = descriptor.implementation(),
            index,
            applicability = ?applicability,
            "registered interceptor"
        );
        self.registry.interceptors.push(descriptor);
        self
    }

    /// Freeze the registry.
    ///
    /// Fails if a command or query type has more than one handler.
    pub fn build(self) -> Result<Mediator, ConfigError> {
        let registry = self.registry.build()?;
        tracing::debug!(
            handlers = registry.handlers().count(),
            interceptors = registry.interceptors().len(),
            validation = self.options.validation,
            "mediator built"
        );
        Ok(Mediator::new(registry, self.options, self.services))
    }
}
