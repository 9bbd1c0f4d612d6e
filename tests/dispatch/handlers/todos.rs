//! Todo commands, queries and validators.

use std::sync::Arc;

use mediator_rs::{
    async_trait, CancellationToken, CommandHandler, QueryHandler, Registrar, Rules, Services,
    ValidationOutcome, Validator,
};

use crate::support::{
    CompleteTodo, CreateTodo, GetTodo, ListTodos, Todo, TodoStore, Trace,
};

pub fn register(r: &mut Registrar<'_>) {
    r.command::<CreateTodo, _, _>(TodoHandlers::from_services)
        .command::<CompleteTodo, _, _>(TodoHandlers::from_services)
        .query::<GetTodo, _, _>(TodoHandlers::from_services)
        .query::<ListTodos, _, _>(TodoHandlers::from_services)
        .validator::<CreateTodo, _, _>(|_: &Services| Ok(TitleRules))
        .validator::<CreateTodo, _, _>(|_: &Services| Ok(PriorityRange));
}

/// One type handling every todo request.
pub struct TodoHandlers {
    store: Arc<TodoStore>,
    trace: Arc<Trace>,
}

impl TodoHandlers {
    pub fn from_services(services: &Services) -> Result<Self, mediator_rs::DispatchError> {
        Ok(Self {
            store: services.get()?,
            trace: services.get()?,
        })
    }
}

#[async_trait]
impl CommandHandler<CreateTodo> for TodoHandlers {
    async fn handle(&self, command: CreateTodo, _: &CancellationToken) -> anyhow::Result<u64> {
        self.trace.record("Handler");
        Ok(self.store.insert(command.title, command.priority))
    }
}

#[async_trait]
impl CommandHandler<CompleteTodo> for TodoHandlers {
    async fn handle(&self, command: CompleteTodo, _: &CancellationToken) -> anyhow::Result<()> {
        self.trace.record("Handler");
        self.store.complete(command.id)?;
        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetTodo> for TodoHandlers {
    async fn handle(&self, query: GetTodo, _: &CancellationToken) -> anyhow::Result<Option<Todo>> {
        self.trace.record("Handler");
        Ok(self.store.get(query.id))
    }
}

#[async_trait]
impl QueryHandler<ListTodos> for TodoHandlers {
    async fn handle(&self, _: ListTodos, _: &CancellationToken) -> anyhow::Result<Vec<Todo>> {
        self.trace.record("Handler");
        Ok(self.store.all())
    }
}

pub struct TitleRules;

#[async_trait]
impl Validator<CreateTodo> for TitleRules {
    async fn validate(&self, command: &CreateTodo, _: &CancellationToken) -> ValidationOutcome {
        let mut rules = Rules::new();
        rules
            .check(!command.title.trim().is_empty(), "title", "Title is required")
            .check_with_code(
                command.title.len() <= 40,
                "title",
                "Title must be at most 40 characters",
                "MaxLength",
            );
        rules.into_outcome()
    }
}

pub struct PriorityRange;

#[async_trait]
impl Validator<CreateTodo> for PriorityRange {
    async fn validate(&self, command: &CreateTodo, _: &CancellationToken) -> ValidationOutcome {
        if command.priority <= 5 {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::invalid("priority", "Priority must be between 0 and 5")
        }
    }
}
