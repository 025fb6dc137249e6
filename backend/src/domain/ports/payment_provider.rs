//! Port for the external subscription billing provider.
//!
//! Adapters own transport, authentication and wire formats; the domain only
//! sees customers, checkout sessions, subscriptions and verified events.

use async_trait::async_trait;

use crate::domain::{CheckoutRequest, CheckoutSession, ProviderEvent, SubscriptionSnapshot};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment provider adapters.
    pub enum PaymentProviderError {
        /// Webhook signature header missing, malformed, stale or not matching.
        SignatureInvalid { message: String } => "webhook signature rejected: {message}",
        /// Signed webhook body could not be decoded.
        InvalidPayload { message: String } => "webhook payload invalid: {message}",
        /// Provider could not be reached or timed out.
        Transport { message: String } => "payment provider transport failed: {message}",
        /// Provider answered with a non-success status.
        Api { status: u16, message: String } => "payment provider rejected request ({status}): {message}",
        /// Provider response body did not match the expected shape.
        Decode { message: String } => "payment provider response invalid: {message}",
        /// No provider credentials are configured.
        Unavailable { message: String } => "payment provider unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a remote customer and return its reference.
    ///
    /// `idempotency_key` lets the provider collapse retries of the same
    /// logical creation into one customer.
    async fn create_customer(
        &self,
        name: &str,
        email: &str,
        idempotency_key: &str,
    ) -> Result<String, PaymentProviderError>;

    /// Create a subscription-mode checkout session.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentProviderError>;

    /// Fetch the current state of a subscription.
    async fn fetch_subscription(
        &self,
        subscription_ref: &str,
    ) -> Result<SubscriptionSnapshot, PaymentProviderError>;

    /// Verify a webhook signature and decode the event it carries.
    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, PaymentProviderError>;
}

/// Provider used when no billing credentials are configured.
///
/// Every remote call fails as unavailable and every webhook is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentProvider;

#[async_trait]
impl PaymentProvider for FixturePaymentProvider {
    async fn create_customer(
        &self,
        _name: &str,
        _email: &str,
        _idempotency_key: &str,
    ) -> Result<String, PaymentProviderError> {
        Err(PaymentProviderError::unavailable("billing is not configured"))
    }

    async fn create_checkout_session(
        &self,
        _request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        Err(PaymentProviderError::unavailable("billing is not configured"))
    }

    async fn fetch_subscription(
        &self,
        _subscription_ref: &str,
    ) -> Result<SubscriptionSnapshot, PaymentProviderError> {
        Err(PaymentProviderError::unavailable("billing is not configured"))
    }

    fn verify_webhook(
        &self,
        _payload: &[u8],
        _signature: &str,
    ) -> Result<ProviderEvent, PaymentProviderError> {
        Err(PaymentProviderError::signature_invalid(
            "no webhook secret configured",
        ))
    }
}
