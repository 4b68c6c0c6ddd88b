//! Metrics for storage operations.

use std::time::Instant;

use data_model::StorageTarget;

use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Metrics for storage operations.
#[derive(Clone)]
pub struct StorageMetrics {
    /// Histogram for operation latencies.
    pub operations: Histogram<f64>,

    /// Counter for operation errors.
    pub errors: Counter<u64>,
}

impl StorageMetrics {
    pub fn new(meter: &Meter) -> Self {
        let operations = meter
            .f64_histogram("storage_operation_duration_seconds")
            .with_description("Duration of storage operations in seconds")
            .build();

        let errors = meter
            .u64_counter("storage_errors_total")
            .with_description("Total number of failed storage operations")
            .build();

        Self { operations, errors }
    }

    /// Uses the global meter provider; a no-op until one is installed.
    pub fn from_global() -> Self {
        Self::new(&opentelemetry::global::meter("storage-service"))
    }

    /// `target` is `None` for labels that name no known backend.
    pub fn timer(&self, operation: &'static str, target: Option<StorageTarget>) -> Timer {
        Timer::start_with_labels(&self.operations, &labels(operation, target))
    }

    pub fn record_error(
        &self,
        operation: &'static str,
        target: Option<StorageTarget>,
        kind: &'static str,
    ) {
        let mut attrs = labels(operation, target);
        attrs.push(KeyValue::new("kind", kind));
        self.errors.add(1, &attrs);
    }
}

fn target_label(target: Option<StorageTarget>) -> &'static str {
    match target {
        Some(StorageTarget::File) => "file",
        Some(StorageTarget::Blob) => "blob",
        Some(StorageTarget::Table) => "table",
        None => "unknown",
    }
}

fn labels(operation: &'static str, target: Option<StorageTarget>) -> Vec<KeyValue> {
    vec![
        KeyValue::new("op", operation),
        KeyValue::new("target", target_label(target)),
    ]
}

/// Records elapsed time into the histogram when dropped.
pub struct Timer {
    start: Instant,
    histogram: Histogram<f64>,
    labels: Vec<KeyValue>,
}

impl Timer {
    pub fn start_with_labels(histogram: &Histogram<f64>, labels: &[KeyValue]) -> Self {
        Self {
            start: Instant::now(),
            histogram: histogram.clone(),
            labels: labels.to_vec(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.record(duration, &self.labels);
    }
}
