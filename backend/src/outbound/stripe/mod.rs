//! Stripe outbound adapter.
//!
//! Implements the `PaymentProvider` port over the Stripe REST API and
//! verifies webhook signatures locally.

mod dto;
mod http_client;
mod signature;

pub use http_client::{StripeClient, StripeConfig};
pub use signature::{DEFAULT_TOLERANCE, WebhookVerifier};
