//! Dependency bundle handed to handler, validator and interceptor factories.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::DispatchError;

/// Collaborators available to factories, keyed by type.
///
/// A `Services` built for one unit of work can sit on top of the
/// application-wide bundle; lookups check the overlay first.
///
/// ## Example
///
/// ```ignore
/// let services = Services::new().with(TodoStore::default());
///
/// registrar.command::<CreateTodo, _, _>(|services| {
///     Ok(CreateTodoHandler::new(services.get::<TodoStore>()?))
/// });
/// ```
#[derive(Clone, Default)]
pub struct Services {
    entries: HashMap<TypeId, Entry>,
    parent: Option<Arc<Services>>,
}

#[derive(Clone)]
struct Entry {
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collaborator, replacing any earlier one of the same type.
    pub fn with<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.with_arc(Arc::new(value))
    }

    /// Add an already shared collaborator.
    pub fn with_arc<T: Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.insert_arc(value);
        self
    }

    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.insert_arc(Arc::new(value));
    }

    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                name: std::any::type_name::<T>(),
                value,
            },
        );
    }

    /// Look up a collaborator, failing with `MissingService` if absent.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, DispatchError> {
        self.find::<T>().ok_or(DispatchError::MissingService {
            service: std::any::type_name::<T>(),
        })
    }

    /// Look up a collaborator that may legitimately be absent.
    pub fn find<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        match self.entries.get(&TypeId::of::<T>()) {
            Some(entry) => entry.value.clone().downcast::<T>().ok(),
            None => self.parent.as_ref().and_then(|parent| parent.find::<T>()),
        }
    }

    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.find::<T>().is_some()
    }

    /// Stack `self` on top of `parent`.
    pub(crate) fn over(mut self, parent: Arc<Services>) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.values().map(|entry| entry.name).collect();
        names.sort_unstable();
        f.debug_struct("Services")
            .field("entries", &names)
            .field("parent", &self.parent)
            .finish()
    }
}
