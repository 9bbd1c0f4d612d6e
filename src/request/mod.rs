//! Request model: commands, queries and notifications.
//!
//! A request's identity is its concrete Rust type. Commands and queries are
//! routed to exactly one handler through the interceptor pipeline;
//! notifications fan out to zero or more handlers and bypass the pipeline.
//!
//! ## Example
//!
//! ```ignore
//! use mediator_rs::{Command, Notification, Query};
//!
//! #[derive(Command)]
//! #[command(output = u64)]
//! struct CreateTodo { title: String }
//!
//! #[derive(Command)]
//! struct DeleteTodo { id: u64 }          // Output = NoValue
//!
//! #[derive(Query)]
//! #[query(output = Vec<String>)]
//! struct ListTodos;
//!
//! #[derive(Notification)]
//! struct TodoDeleted { id: u64 }
//! ```

mod envelope;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use envelope::{Envelope, Response};

/// Result of a command that produces no meaningful value.
///
/// This is the unit type: zero-sized, and every value compares equal.
pub type NoValue = ();

/// A request that may change state.
pub trait Command: Send + Sync + 'static {
    /// What the handler returns. Use [`NoValue`] when there is nothing to return.
    type Output: Send + 'static;
}

/// A request that reads state and always produces a result.
pub trait Query: Send + Sync + 'static {
    type Output: Send + 'static;
}

/// A fire-and-forget event with zero or more independent handlers.
pub trait Notification: Send + Sync + 'static {}

/// The kind of a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Command,
    Query,
    Notification,
}

impl RequestKind {
    /// Lower-case name, used as a tag value.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Command => "command",
            RequestKind::Query => "query",
            RequestKind::Notification => "notification",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
