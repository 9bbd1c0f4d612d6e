//! Registry: what handles, validates and intercepts each request type.
//!
//! Rust has no runtime reflection to scan a module for handler types, so
//! discovery is an explicit registration pass. A module exposes a
//! `register` function (or any [`HandlerModule`]) that lists its handlers
//! and validators on a [`Registrar`]:
//!
//! ```ignore
//! // src/todos/mod.rs
//! pub fn register(r: &mut Registrar<'_>) {
//!     r.command::<CreateTodo, _, _>(|s| Ok(TodoHandlers::new(s.get()?)))
//!         .command::<DeleteTodo, _, _>(|s| Ok(TodoHandlers::new(s.get()?)))
//!         .query::<ListTodos, _, _>(|s| Ok(TodoHandlers::new(s.get()?)))
//!         .validator::<CreateTodo, _, _>(|_| Ok(TitleRequired));
//! }
//!
//! let mediator = mediator_rs::register_handlers!(Mediator::builder(), todos, audit)
//!     .enable_validation()
//!     .build()?;
//! ```
//!
//! The registry is frozen once the `Mediator` is built; dispatch only reads it.

mod descriptor;
mod lifetime;
mod registrar;
mod services;

use std::any::TypeId;
use std::collections::HashMap;

pub use descriptor::{
    HandlerDescriptor, InterceptorDescriptor, NotificationDescriptor, ValidatorDescriptor,
};
pub(crate) use descriptor::ErasedNotification;
pub(crate) use lifetime::{InstanceCache, Resolver};
pub use lifetime::{Factory, Lifetime};
pub use registrar::{construct, HandlerModule, Registrar};
pub use services::Services;

use crate::error::ConfigError;

/// Descriptors collected during configuration, in registration order.
#[derive(Default)]
pub(crate) struct RegistryBuilder {
    pub(crate) handlers: Vec<HandlerDescriptor>,
    pub(crate) notifications: Vec<NotificationDescriptor>,
    pub(crate) validators: Vec<ValidatorDescriptor>,
    pub(crate) interceptors: Vec<InterceptorDescriptor>,
}

impl RegistryBuilder {
    /// Freeze into a `Registry`, rejecting a second handler for any
    /// command or query type.
    pub(crate) fn build(self) -> Result<Registry, ConfigError> {
        let mut handlers: HashMap<TypeId, HandlerDescriptor> = HashMap::new();
        for descriptor in self.handlers {
            if let Some(existing) = handlers.get(&descriptor.request_type()) {
                return Err(ConfigError::DuplicateHandler {
                    kind: descriptor.kind(),
                    request_type: descriptor.request_name(),
                    existing: existing.implementation(),
                    duplicate: descriptor.implementation(),
                });
            }
            handlers.insert(descriptor.request_type(), descriptor);
        }

        let mut notifications: HashMap<TypeId, Vec<NotificationDescriptor>> = HashMap::new();
        for descriptor in self.notifications {
            notifications
                .entry(descriptor.request_type())
                .or_default()
                .push(descriptor);
        }

        let mut validators: HashMap<TypeId, Vec<ValidatorDescriptor>> = HashMap::new();
        for descriptor in self.validators {
            validators
                .entry(descriptor.request_type())
                .or_default()
                .push(descriptor);
        }

        Ok(Registry {
            handlers,
            notifications,
            validators,
            interceptors: self.interceptors,
        })
    }
}

/// Read-only view of everything registered with a `Mediator`.
#[derive(Debug)]
pub struct Registry {
    handlers: HashMap<TypeId, HandlerDescriptor>,
    notifications: HashMap<TypeId, Vec<NotificationDescriptor>>,
    validators: HashMap<TypeId, Vec<ValidatorDescriptor>>,
    interceptors: Vec<InterceptorDescriptor>,
}

impl Registry {
    /// The handler for a command or query type.
    pub fn handler(&self, request_type: TypeId) -> Option<&HandlerDescriptor> {
        self.handlers.get(&request_type)
    }

    pub fn handler_for<R: 'static>(&self) -> Option<&HandlerDescriptor> {
        self.handler(TypeId::of::<R>())
    }

    /// Every command and query handler, in no particular order.
    pub fn handlers(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.handlers.values()
    }

    /// Notification handlers for a type, in registration order.
    pub fn notification_handlers(&self, notification_type: TypeId) -> &[NotificationDescriptor] {
        self.notifications
            .get(&notification_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn notification_handlers_for<N: 'static>(&self) -> &[NotificationDescriptor] {
        self.notification_handlers(TypeId::of::<N>())
    }

    /// Validators for a request type, in registration order.
    pub fn validators(&self, request_type: TypeId) -> &[ValidatorDescriptor] {
        self.validators
            .get(&request_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn validators_for<R: 'static>(&self) -> &[ValidatorDescriptor] {
        self.validators(TypeId::of::<R>())
    }

    /// Interceptors in registration order.
    pub fn interceptors(&self) -> &[InterceptorDescriptor] {
        &self.interceptors
    }
}
