//! Prometheus-backed metrics adapters, available with the `metrics` feature.

mod prometheus_requests;

pub use prometheus_requests::PrometheusRequestTelemetry;
