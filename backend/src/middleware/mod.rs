//! Request middleware for cross-cutting request lifecycle concerns.

pub mod telemetry;
pub mod timeout;
pub mod trace;

pub use telemetry::RequestMetrics;
pub use timeout::RequestTimeout;
pub use trace::Trace;
