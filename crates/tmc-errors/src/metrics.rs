use std::collections::HashMap;

/// Counter/gauge/histogram primitives keyed by label tuples, implemented by
/// whatever metrics backend a host binary wires up. Every crate in the core
/// takes an `Arc<dyn MetricsSink>` at construction rather than reaching for
/// a process-wide recorder.
pub trait MetricsSink: Send + Sync {
    fn incr_counter(&self, name: &str, labels: &HashMap<String, String>, value: u64);

    fn set_gauge(&self, name: &str, labels: &HashMap<String, String>, value: f64);

    fn observe_histogram(&self, name: &str, labels: &HashMap<String, String>, value: f64);
}

/// Discards every observation. The default collaborator for tests and for
/// hosts that haven't wired a real sink yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn incr_counter(&self, _name: &str, _labels: &HashMap<String, String>, _value: u64) {}

    fn set_gauge(&self, _name: &str, _labels: &HashMap<String, String>, _value: f64) {}

    fn observe_histogram(&self, _name: &str, _labels: &HashMap<String, String>, _value: f64) {}
}
