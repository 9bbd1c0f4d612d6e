mod request;

use proc_macro::TokenStream;

use request::RequestContract;

// ============================================================================
// #[derive(Command)] derive macro
// ============================================================================

/// Derive macro for the `Command` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Command)]
/// #[command(output = TodoId)]
/// struct CreateTodo {
///     title: String,
/// }
///
/// // No output attribute: the command produces `NoValue`.
/// #[derive(Command)]
/// struct DeleteTodo {
///     id: TodoId,
/// }
/// ```
#[proc_macro_derive(Command, attributes(command))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    request::derive_request(input, RequestContract::Command)
}

// ============================================================================
// #[derive(Query)] derive macro
// ============================================================================

/// Derive macro for the `Query` trait.
///
/// A query always produces a result, so `#[query(output = T)]` is required.
///
/// ```ignore
/// #[derive(Query)]
/// #[query(output = Vec<Todo>)]
/// struct ListTodos;
/// ```
#[proc_macro_derive(Query, attributes(query))]
pub fn derive_query(input: TokenStream) -> TokenStream {
    request::derive_request(input, RequestContract::Query)
}

// ============================================================================
// #[derive(Notification)] derive macro
// ============================================================================

/// Derive macro for the `Notification` marker trait.
///
/// ```ignore
/// #[derive(Notification)]
/// struct TodoCompleted {
///     id: TodoId,
/// }
/// ```
#[proc_macro_derive(Notification)]
pub fn derive_notification(input: TokenStream) -> TokenStream {
    request::derive_request(input, RequestContract::Notification)
}
