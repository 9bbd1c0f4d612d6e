//! Module registration, configuration errors and registry introspection.

use mediator_rs::{
    Applicability, CancellationToken, ConfigError, DispatchError, Lifetime, Mediator,
    MediatorOptions, RequestKind,
};

use crate::handlers;
use crate::support::{
    services, CompleteTodo, CreateTodo, GetTodo, ListTodos, Recording, TodoCreated,
};

#[tokio::test]
async fn register_handlers_macro_wires_every_module() {
    let (services, _, trace) = services();
    let mediator = mediator_rs::register_handlers!(
        Mediator::builder().services(services),
        handlers::todos,
        handlers::audit,
    )
    .build()
    .unwrap();
    let dispatcher = mediator.scope();
    let cancel = CancellationToken::new();

    let id = dispatcher.send(CreateTodo::new("read"), &cancel).await.unwrap();
    dispatcher.send(CompleteTodo { id }, &cancel).await.unwrap();
    dispatcher.publish(TodoCreated { id }, &cancel).await.unwrap();

    let todo = dispatcher.query(GetTodo { id }, &cancel).await.unwrap().unwrap();
    assert!(todo.done);
    assert_eq!(trace.count(&format!("audit:{}", id)), 1);
    assert_eq!(trace.count(&format!("mail:{}", id)), 1);
}

#[test]
fn one_implementation_registered_under_several_contracts() {
    let mediator = Mediator::builder()
        .handlers(handlers::todos::register)
        .build()
        .unwrap();
    let registry = mediator.registry();

    let create = registry.handler_for::<CreateTodo>().unwrap();
    let list = registry.handler_for::<ListTodos>().unwrap();
    assert_eq!(create.kind(), RequestKind::Command);
    assert_eq!(list.kind(), RequestKind::Query);
    assert_eq!(create.implementation(), list.implementation());
    assert!(create.implementation().ends_with("TodoHandlers"));
    assert_eq!(create.result_name(), "u64");
    assert_eq!(create.lifetime(), Lifetime::Scoped);
    assert_eq!(registry.handlers().count(), 4);
    assert_eq!(registry.validators_for::<CreateTodo>().len(), 2);
    assert!(registry.validators_for::<GetTodo>().is_empty());
}

#[test]
fn registering_a_module_twice_is_a_configuration_error() {
    let err = Mediator::builder()
        .handlers(handlers::todos::register)
        .handlers(handlers::todos::register)
        .build()
        .unwrap_err();

    match err {
        ConfigError::DuplicateHandler {
            kind,
            request_type,
            existing,
            duplicate,
        } => {
            assert_eq!(kind, RequestKind::Command);
            assert!(request_type.ends_with("CreateTodo"));
            assert_eq!(existing, duplicate);
        }
        other => panic!("expected duplicate handler, got {other:?}"),
    }
}

#[tokio::test]
async fn unregistered_request_fails_before_any_interceptor() {
    let (services, _, trace) = services();
    let mediator = Mediator::builder()
        .services(services)
        .handlers(handlers::audit::register)
        .add_interceptor_with(
            Applicability::All,
            Lifetime::Transient,
            Recording::<1>::from_services,
        )
        .build()
        .unwrap();

    let err = mediator
        .send(CreateTodo::new("nobody home"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        DispatchError::Unregistered { kind, request_type } => {
            assert_eq!(kind, RequestKind::Command);
            assert!(request_type.ends_with("CreateTodo"));
        }
        other => panic!("expected unregistered, got {other:?}"),
    }
    assert!(trace.events().is_empty());
}

#[tokio::test]
async fn missing_collaborator_is_reported_at_dispatch() {
    let mediator = Mediator::builder()
        .handlers(handlers::todos::register)
        .build()
        .unwrap();

    let err = mediator
        .query(ListTodos, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        DispatchError::MissingService { service } => assert!(service.ends_with("TodoStore")),
        other => panic!("expected missing service, got {other:?}"),
    }
}

#[tokio::test]
async fn options_load_from_json() {
    let options = MediatorOptions::from_json_str(
        r#"{ "validation": true, "default_lifetime": "singleton" }"#,
    )
    .unwrap();
    let (services, store, _) = services();
    let mediator = Mediator::builder()
        .options(options)
        .services(services)
        .handlers(handlers::todos::register)
        .build()
        .unwrap();

    assert!(mediator.options().validation);
    assert_eq!(
        mediator.registry().handler_for::<CreateTodo>().unwrap().lifetime(),
        Lifetime::Singleton
    );

    let err = mediator
        .send(CreateTodo::new(""), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.as_validation().is_some());
    assert_eq!(store.len(), 0);
}

#[test]
fn malformed_options_are_rejected() {
    let err = MediatorOptions::from_json_str(r#"{ "publish_strategy": "sometimes" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOptions(_)));
}
