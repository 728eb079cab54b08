//! Service metrics.
//!
//! Instruments are OpenTelemetry counters and histograms, available with the
//! `metrics` feature. Without it every recording call is a no-op so callers
//! never branch on the feature.

#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
#[cfg(feature = "metrics")]
use std::sync::Arc;

#[cfg(feature = "metrics")]
struct Instruments {
    _meter: Meter,
    predictions: Counter<u64>,
    rejections: Counter<u64>,
    storage_failures: Counter<u64>,
    registry_events: Counter<u64>,
    inference_duration: Histogram<f64>,
}

/// Handle to the service's metric instruments.
#[derive(Clone, Default)]
pub struct ServiceMetrics {
    #[cfg(feature = "metrics")]
    inner: Option<Arc<Instruments>>,
}

impl ServiceMetrics {
    /// Create instruments on the global meter provider.
    #[cfg(feature = "metrics")]
    pub fn new() -> Self {
        let meter = global::meter("algobio_server");

        let predictions = meter
            .u64_counter("classifier.predictions")
            .with_description("Classifications served")
            .build();
        let rejections = meter
            .u64_counter("classifier.rejections")
            .with_description("Requests rejected before inference")
            .build();
        let storage_failures = meter
            .u64_counter("classifier.storage_failures")
            .with_description("Classification store failures")
            .build();
        let registry_events = meter
            .u64_counter("classifier.registry_events")
            .with_description("Registry registrations, heartbeats and failures")
            .build();
        let inference_duration = meter
            .f64_histogram("classifier.inference_duration")
            .with_unit("seconds")
            .with_description("Vectorization and scoring time per request")
            .build();

        tracing::debug!("Service metric instruments created");
        Self {
            inner: Some(Arc::new(Instruments {
                _meter: meter,
                predictions,
                rejections,
                storage_failures,
                registry_events,
                inference_duration,
            })),
        }
    }

    /// Create a no-op handle.
    #[cfg(not(feature = "metrics"))]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one served classification.
    pub fn record_prediction(&self, label_type: &str, suppressed: bool, duration_secs: f64) {
        #[cfg(feature = "metrics")]
        if let Some(inner) = &self.inner {
            let labels = &[
                KeyValue::new("label_type", label_type.to_string()),
                KeyValue::new("suppressed", suppressed),
            ];
            inner.predictions.add(1, labels);
            inner.inference_duration.record(duration_secs, labels);
        }
        #[cfg(not(feature = "metrics"))]
        let _ = (label_type, suppressed, duration_secs);
    }

    /// Record a request rejected before inference.
    pub fn record_rejection(&self, reason: &'static str) {
        #[cfg(feature = "metrics")]
        if let Some(inner) = &self.inner {
            inner.rejections.add(1, &[KeyValue::new("reason", reason)]);
        }
        #[cfg(not(feature = "metrics"))]
        let _ = reason;
    }

    /// Record a store failure.
    pub fn record_storage_failure(&self, operation: &'static str) {
        #[cfg(feature = "metrics")]
        if let Some(inner) = &self.inner {
            inner
                .storage_failures
                .add(1, &[KeyValue::new("operation", operation)]);
        }
        #[cfg(not(feature = "metrics"))]
        let _ = operation;
    }

    /// Record a registry interaction outcome.
    pub fn record_registry_event(&self, event: &'static str) {
        #[cfg(feature = "metrics")]
        if let Some(inner) = &self.inner {
            inner
                .registry_events
                .add(1, &[KeyValue::new("event", event)]);
        }
        #[cfg(not(feature = "metrics"))]
        let _ = event;
    }
}

impl std::fmt::Debug for ServiceMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[cfg(feature = "metrics")]
        let enabled = self.inner.is_some();
        #[cfg(not(feature = "metrics"))]
        let enabled = false;
        f.debug_struct("ServiceMetrics")
            .field("enabled", &enabled)
            .finish()
    }
}
