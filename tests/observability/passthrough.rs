//! With nothing listening, the built-in interceptors change nothing.

use mediator_rs::{
    Applicability, CancellationToken, LoggingInterceptor, Mediator, TracingInterceptor,
};

use crate::support::{register, Balance, Charge, Declined};

fn instrumented() -> Mediator {
    let builder = Mediator::builder()
        .handlers(register)
        .add_interceptor::<TracingInterceptor>(Applicability::All)
        .add_interceptor::<LoggingInterceptor>(Applicability::All);
    #[cfg(feature = "metrics")]
    let builder = builder.add_interceptor::<mediator_rs::MetricsInterceptor>(Applicability::All);
    builder.build().unwrap()
}

#[tokio::test]
async fn results_and_failures_are_untouched_without_collectors() {
    let mediator = instrumented();
    let cancel = CancellationToken::new();

    assert_eq!(mediator.send(Charge { cents: 99 }, &cancel).await.unwrap(), 99);
    assert_eq!(mediator.query(Balance, &cancel).await.unwrap(), 500);

    let err = mediator
        .send(Charge { cents: 9_999 }, &cancel)
        .await
        .unwrap_err();
    assert!(err.downcast_handler::<Declined>().is_some());
    assert_eq!(err.to_string(), "card declined");
}
