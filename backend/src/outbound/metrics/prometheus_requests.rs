//! Prometheus adapter for HTTP request telemetry.
//!
//! Metrics are registered with a caller-supplied registry, which the
//! `/metrics` endpoint later encodes.

use async_trait::async_trait;
use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

use crate::domain::ports::{RequestSample, RequestTelemetry, RequestTelemetryError};

const LABELS: [&str; 3] = ["method", "path", "code"];

/// Prometheus-backed request recorder.
///
/// # Metrics
///
/// - `http_requests_total` (counter)
/// - `http_request_duration_seconds` (histogram, default buckets)
///
/// Both carry `method`, `path` (matched route pattern) and `code` labels.
pub struct PrometheusRequestTelemetry {
    requests_total: CounterVec,
    request_duration: HistogramVec,
}

impl PrometheusRequestTelemetry {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled"),
            &LABELS,
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &LABELS,
        )?;
        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        Ok(Self {
            requests_total,
            request_duration,
        })
    }

    fn record(&self, sample: &RequestSample) {
        let code = sample.status.to_string();
        let labels = [sample.method.as_str(), sample.route.as_str(), code.as_str()];
        self.requests_total.with_label_values(&labels).inc();
        self.request_duration
            .with_label_values(&labels)
            .observe(sample.duration.as_secs_f64());
    }
}

#[async_trait]
impl RequestTelemetry for PrometheusRequestTelemetry {
    async fn record_request(&self, sample: &RequestSample) -> Result<(), RequestTelemetryError> {
        self.record(sample);
        Ok(())
    }
}
