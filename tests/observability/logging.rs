//! `LoggingInterceptor`.

use mediator_rs::{Applicability, CancellationToken, LoggingInterceptor, Mediator};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use crate::support::{register, Capture, Charge, Declined};

fn mediator() -> Mediator {
    Mediator::builder()
        .handlers(register)
        .add_interceptor::<LoggingInterceptor>(Applicability::CommandOnly)
        .build()
        .unwrap()
}

#[tokio::test]
async fn success_is_logged_at_debug() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    mediator()
        .send(Charge { cents: 10 }, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(capture.events_with_message("handling request").len(), 1);
    let handled = capture.events_with_message("request handled");
    assert_eq!(handled.len(), 1);
    assert_eq!(handled[0].level, Level::DEBUG);
    assert!(handled[0].fields.contains_key("elapsed_ms"));
    assert!(capture.events_with_message("request failed").is_empty());
}

#[tokio::test]
async fn failure_is_logged_at_warn_and_returned_unchanged() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let err = mediator()
        .send(Charge { cents: 2_000 }, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.downcast_handler::<Declined>().is_some());

    let failed = capture.events_with_message("request failed");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].level, Level::WARN);
    assert_eq!(failed[0].fields["error_kind"], "handler");
    assert_eq!(failed[0].fields["error"], "card declined");
}
