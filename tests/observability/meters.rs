//! `MetricsInterceptor`, observed through a recorder local to each test.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::executor::block_on;
use mediator_rs::observability::{REQUESTS_TOTAL, REQUEST_DURATION_SECONDS, REQUEST_ERRORS_TOTAL};
use mediator_rs::{Applicability, CancellationToken, Mediator, MetricsInterceptor};
use metrics::{
    Counter, CounterFn, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
    SharedString, Unit,
};
use parking_lot::Mutex;

use crate::support::{register, Balance, Charge};

type Labels = Vec<(String, String)>;
type Series<T> = Arc<Mutex<BTreeMap<(String, Labels), T>>>;

#[derive(Clone, Default)]
struct TestRecorder {
    counters: Series<u64>,
    histograms: Series<Vec<f64>>,
}

fn series_key(key: &Key) -> (String, Labels) {
    let mut labels: Labels = key
        .labels()
        .map(|label| (label.key().to_string(), label.value().to_string()))
        .collect();
    labels.sort();
    (key.name().to_string(), labels)
}

fn matches(labels: &Labels, wanted: &[(&str, &str)]) -> bool {
    wanted
        .iter()
        .all(|(k, v)| labels.iter().any(|(lk, lv)| lk == k && lv.as_str() == *v))
}

impl TestRecorder {
    fn counter(&self, name: &str, wanted: &[(&str, &str)]) -> u64 {
        self.counters
            .lock()
            .iter()
            .filter(|((n, labels), _)| n == name && matches(labels, wanted))
            .map(|(_, value)| *value)
            .sum()
    }

    fn samples(&self, name: &str, wanted: &[(&str, &str)]) -> usize {
        self.histograms
            .lock()
            .iter()
            .filter(|((n, labels), _)| n == name && matches(labels, wanted))
            .map(|(_, values)| values.len())
            .sum()
    }
}

struct CounterHandle {
    key: (String, Labels),
    series: Series<u64>,
}

impl CounterFn for CounterHandle {
    fn increment(&self, value: u64) {
        *self.series.lock().entry(self.key.clone()).or_default() += value;
    }

    fn absolute(&self, value: u64) {
        self.series.lock().insert(self.key.clone(), value);
    }
}

struct HistogramHandle {
    key: (String, Labels),
    series: Series<Vec<f64>>,
}

impl HistogramFn for HistogramHandle {
    fn record(&self, value: f64) {
        self.series
            .lock()
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

impl Recorder for TestRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CounterHandle {
            key: series_key(key),
            series: self.counters.clone(),
        }))
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(HistogramHandle {
            key: series_key(key),
            series: self.histograms.clone(),
        }))
    }
}

fn mediator() -> Mediator {
    Mediator::builder()
        .handlers(register)
        .add_interceptor::<MetricsInterceptor>(Applicability::All)
        .build()
        .unwrap()
}

#[test]
fn counts_requests_by_kind_and_status() {
    let recorder = TestRecorder::default();
    let mediator = mediator();
    let cancel = CancellationToken::new();

    metrics::with_local_recorder(&recorder, || {
        block_on(async {
            mediator.send(Charge { cents: 1 }, &cancel).await.unwrap();
            mediator.send(Charge { cents: 2 }, &cancel).await.unwrap();
            mediator.query(Balance, &cancel).await.unwrap();
            mediator.send(Charge { cents: 5_000 }, &cancel).await.unwrap_err();
        })
    });

    assert_eq!(
        recorder.counter(REQUESTS_TOTAL, &[("kind", "command"), ("status", "ok")]),
        2
    );
    assert_eq!(
        recorder.counter(REQUESTS_TOTAL, &[("kind", "command"), ("status", "error")]),
        1
    );
    assert_eq!(
        recorder.counter(REQUESTS_TOTAL, &[("kind", "query"), ("status", "ok")]),
        1
    );
    assert_eq!(
        recorder.counter(REQUEST_ERRORS_TOTAL, &[("kind", "command"), ("error", "handler")]),
        1
    );
    assert_eq!(recorder.samples(REQUEST_DURATION_SECONDS, &[("kind", "command")]), 3);
    assert_eq!(recorder.samples(REQUEST_DURATION_SECONDS, &[("kind", "query")]), 1);
}

#[test]
fn request_label_is_the_type_name() {
    let recorder = TestRecorder::default();
    let mediator = mediator();

    metrics::with_local_recorder(&recorder, || {
        block_on(mediator.query(Balance, &CancellationToken::new())).unwrap();
    });

    let counters = recorder.counters.lock();
    let ((_, labels), _) = counters.iter().next().unwrap();
    let request = labels.iter().find(|(k, _)| k == "request").unwrap();
    assert!(request.1.ends_with("Balance"));
}
