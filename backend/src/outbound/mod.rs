//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed user repository using Diesel ORM
//! - **stripe**: payment provider over the Stripe REST API
//! - **metrics**: Prometheus-backed request telemetry (feature-gated)
//!
//! Adapters convert between domain types and infrastructure representations.
//! They contain no business logic.

#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod stripe;
