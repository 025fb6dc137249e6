//! Port for recording per-request counters and latencies.
use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording request telemetry.
    pub enum RequestTelemetryError {
        /// Metric exporter rejected the write.
        Export { message: String } => "request telemetry exporter failed: {message}",
    }
}

/// One completed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSample {
    pub method: String,
    /// Matched route pattern (for example `/users/{id}`), never the raw path,
    /// so label cardinality stays bounded.
    pub route: String,
    pub status: u16,
    pub duration: Duration,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestTelemetry: Send + Sync {
    /// Record a completed request.
    async fn record_request(&self, sample: &RequestSample) -> Result<(), RequestTelemetryError>;
}

/// Telemetry sink that discards every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRequestTelemetry;

#[async_trait]
impl RequestTelemetry for NoOpRequestTelemetry {
    async fn record_request(&self, _sample: &RequestSample) -> Result<(), RequestTelemetryError> {
        Ok(())
    }
}
