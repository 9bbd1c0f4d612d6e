//! Instance lifetimes and the resolver that honours them.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::services::Services;
use crate::error::DispatchError;

/// How long a resolved handler, validator or interceptor instance lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// A fresh instance for every resolution.
    Transient,
    /// One instance per `Dispatcher` (unit of work).
    #[default]
    Scoped,
    /// One instance per `Mediator`, shared by every scope and thread.
    Singleton,
}

/// Builds an instance from the dependency bundle.
pub type Factory<T> = Arc<dyn Fn(&Services) -> Result<T, DispatchError> + Send + Sync>;

/// Identity of a single registration.
///
/// Every descriptor draws a fresh id, so two registrations of the same type
/// with different factories never share a cached instance. To share one
/// instance across registrations, put an `Arc` in `Services` and clone it
/// from both factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RegistrationId(u64);

impl RegistrationId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Cache of scoped or singleton instances, keyed by registration.
#[derive(Default)]
pub(crate) struct InstanceCache {
    instances: Mutex<HashMap<RegistrationId, Arc<dyn Any + Send + Sync>>>,
}

impl InstanceCache {
    fn get_or_try_insert<T, F>(
        &self,
        registration: RegistrationId,
        build: F,
    ) -> Result<Arc<T>, DispatchError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T, DispatchError>,
    {
        let mut instances = self.instances.lock();
        if let Some(existing) = instances.get(&registration) {
            if let Ok(instance) = existing.clone().downcast::<T>() {
                return Ok(instance);
            }
        }

        let instance = Arc::new(build()?);
        instances.insert(registration, instance.clone());
        Ok(instance)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.instances.lock().len()
    }
}

/// Resolves instances for one dispatch.
pub(crate) struct Resolver<'a> {
    pub(crate) services: &'a Services,
    pub(crate) scoped: &'a InstanceCache,
    pub(crate) singletons: &'a InstanceCache,
}

impl Resolver<'_> {
    pub(crate) fn resolve<T: Send + Sync + 'static>(
        &self,
        registration: RegistrationId,
        lifetime: Lifetime,
        factory: &Factory<T>,
    ) -> Result<Arc<T>, DispatchError> {
        let build = || factory(self.services);
        match lifetime {
            Lifetime::Transient => build().map(Arc::new),
            Lifetime::Scoped => self.scoped.get_or_try_insert(registration, build),
            Lifetime::Singleton => self.singletons.get_or_try_insert(registration, build),
        }
    }
}
