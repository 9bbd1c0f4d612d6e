//! Shared test domain: todos, a trace recorder and recording interceptors.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mediator_rs::{
    async_trait, CancellationToken, Command, DispatchResult, Envelope, Interceptor, Next,
    Notification, Query, Services,
};
use parking_lot::Mutex;

// ============================================================================
// Domain
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub priority: u8,
    pub done: bool,
}

#[derive(Debug, Clone, Command)]
#[command(output = u64)]
pub struct CreateTodo {
    pub title: String,
    pub priority: u8,
}

impl CreateTodo {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            priority: 1,
        }
    }
}

#[derive(Debug, Command)]
pub struct CompleteTodo {
    pub id: u64,
}

#[derive(Debug, Query)]
#[query(output = Option<Todo>)]
pub struct GetTodo {
    pub id: u64,
}

#[derive(Debug, Query)]
#[query(output = Vec<Todo>)]
pub struct ListTodos;

#[derive(Debug, Clone, Notification)]
pub struct TodoCreated {
    pub id: u64,
}

/// Has no handlers anywhere.
#[derive(Debug, Notification)]
pub struct TodoArchived;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("todo {0} not found")]
pub struct TodoNotFound(pub u64);

#[derive(Default)]
pub struct TodoStore {
    todos: Mutex<BTreeMap<u64, Todo>>,
    next_id: AtomicU64,
}

impl TodoStore {
    pub fn insert(&self, title: String, priority: u8) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.todos.lock().insert(
            id,
            Todo {
                id,
                title,
                priority,
                done: false,
            },
        );
        id
    }

    pub fn complete(&self, id: u64) -> Result<(), TodoNotFound> {
        match self.todos.lock().get_mut(&id) {
            Some(todo) => {
                todo.done = true;
                Ok(())
            }
            None => Err(TodoNotFound(id)),
        }
    }

    pub fn get(&self, id: u64) -> Option<Todo> {
        self.todos.lock().get(&id).cloned()
    }

    pub fn all(&self) -> Vec<Todo> {
        self.todos.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.todos.lock().len()
    }
}

// ============================================================================
// Trace
// ============================================================================

/// Ordered log of what ran, shared through `Services`.
#[derive(Default)]
pub struct Trace {
    events: Mutex<Vec<String>>,
}

impl Trace {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| e.as_str() == event).count()
    }
}

pub fn trace_of(events: &[&str]) -> Vec<String> {
    events.iter().map(|e| e.to_string()).collect()
}

/// A store plus a trace, the collaborators every handler here needs.
pub fn services() -> (Services, Arc<TodoStore>, Arc<Trace>) {
    let store = Arc::new(TodoStore::default());
    let trace = Arc::new(Trace::default());
    let services = Services::new()
        .with_arc(store.clone())
        .with_arc(trace.clone());
    (services, store, trace)
}

// ============================================================================
// Interceptors
// ============================================================================

/// Records `I{N}-enter` and `I{N}-exit` around the rest of the chain.
pub struct Recording<const N: usize> {
    trace: Arc<Trace>,
}

impl<const N: usize> Recording<N> {
    pub fn from_services(services: &Services) -> Result<Self, mediator_rs::DispatchError> {
        Ok(Self {
            trace: services.get::<Trace>()?,
        })
    }
}

#[async_trait]
impl<const N: usize> Interceptor for Recording<N> {
    async fn intercept(
        &self,
        request: Envelope,
        cancel: CancellationToken,
        next: Next,
    ) -> DispatchResult {
        self.trace.record(format!("I{}-enter", N));
        let result = next.run(request, cancel).await;
        self.trace.record(format!("I{}-exit", N));
        result
    }
}
