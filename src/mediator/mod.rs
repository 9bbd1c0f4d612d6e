//! Mediator: the public dispatch surface.
//!
//! A [`MediatorBuilder`] collects handler modules, interceptors, services and
//! options, then freezes them into a [`Mediator`]. Each unit of work (an
//! inbound HTTP request, a job, a CLI invocation) opens a [`Dispatcher`]
//! with [`Mediator::scope`] and sends commands, queries and notifications
//! through it:
//!
//! ```ignore
//! let dispatcher = mediator.scope();
//! let id = dispatcher.send(CreateTodo { title: "milk".into() }, &cancel).await?;
//! let todo = dispatcher.query(GetTodo { id }, &cancel).await?;
//! dispatcher.publish(TodoCreated { id }, &cancel).await?;
//! ```
//!
//! Commands and queries go through the interceptor pipeline. Notifications
//! go straight to their handlers, see [`PublishStrategy`].

mod builder;
mod dispatcher;
mod options;
mod publish;

pub use builder::MediatorBuilder;
pub use dispatcher::{Dispatcher, Mediator};
pub use options::{MediatorOptions, PublishStrategy};
pub use publish::{HandlerFailure, PublishFailure};
