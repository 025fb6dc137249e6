//! Reqwest-backed Stripe adapter.
//!
//! Owns transport only: form encoding, bearer authentication, idempotency
//! headers, timeouts and HTTP error mapping. Webhooks are checked locally by
//! [`WebhookVerifier`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{ApiErrorDto, CheckoutSessionDto, CustomerDto, SubscriptionDto};
use super::signature::WebhookVerifier;
use crate::domain::ports::{PaymentProvider, PaymentProviderError};
use crate::domain::{CheckoutRequest, CheckoutSession, ProviderEvent, SubscriptionSnapshot};

const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Connection settings for the Stripe API.
pub struct StripeConfig {
    /// API root, e.g. `https://api.stripe.com/`.
    pub api_base: Url,
    /// Secret API key sent as a bearer token.
    pub secret_key: String,
    /// Signing secret of the webhook endpoint.
    pub webhook_secret: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Stripe adapter implementing [`PaymentProvider`].
pub struct StripeClient {
    client: Client,
    api_base: Url,
    secret_key: Zeroizing<String>,
    verifier: WebhookVerifier,
}

impl StripeClient {
    /// Build the adapter with a timeout-bounded reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: StripeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_base: config.api_base,
            secret_key: Zeroizing::new(config.secret_key),
            verifier: WebhookVerifier::new(config.webhook_secret),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentProviderError> {
        endpoint(&self.api_base, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PaymentProviderError> {
        let response = request
            .bearer_auth(self.secret_key.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode(body.as_ref())
    }
}

fn endpoint(base: &Url, path: &str) -> Result<Url, PaymentProviderError> {
    let root = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{root}/{}", path.trim_start_matches('/')))
        .map_err(|err| PaymentProviderError::transport(format!("invalid endpoint: {err}")))
}

fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "subscription".to_owned()),
        ("customer", request.customer_ref.clone()),
        ("line_items[0][price]", request.price_id.clone()),
        ("line_items[0][quantity]", request.quantity.to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
    ]
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, PaymentProviderError> {
    serde_json::from_slice(body).map_err(|err| {
        PaymentProviderError::decode(format!("invalid Stripe JSON payload: {err}"))
    })
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_customer(
        &self,
        name: &str,
        email: &str,
        idempotency_key: &str,
    ) -> Result<String, PaymentProviderError> {
        let request = self
            .client
            .post(self.endpoint("v1/customers")?)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .form(&[("name", name), ("email", email)]);
        let customer: CustomerDto = self.send(request).await?;
        debug!(customer = %customer.id, "created Stripe customer");
        Ok(customer.id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        let http = self
            .client
            .post(self.endpoint("v1/checkout/sessions")?)
            .form(&checkout_form(request));
        let session: CheckoutSessionDto = self.send(http).await?;
        session.into_domain().map_err(PaymentProviderError::decode)
    }

    async fn fetch_subscription(
        &self,
        subscription_ref: &str,
    ) -> Result<SubscriptionSnapshot, PaymentProviderError> {
        let mut url = self.endpoint("v1/subscriptions")?;
        url.path_segments_mut()
            .map_err(|()| PaymentProviderError::transport("API base cannot carry a path"))?
            .push(subscription_ref);
        let subscription: SubscriptionDto = self.send(self.client.get(url)).await?;
        subscription
            .into_domain()
            .map_err(PaymentProviderError::decode)
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, PaymentProviderError> {
        self.verifier.verify_event(payload, signature)
    }
}

fn map_transport_error(error: reqwest::Error) -> PaymentProviderError {
    if error.is_timeout() {
        PaymentProviderError::transport(format!("request timed out: {error}"))
    } else {
        PaymentProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentProviderError {
    let message = serde_json::from_slice::<ApiErrorDto>(body)
        .ok()
        .and_then(|dto| match (dto.error.error_type, dto.error.message) {
            (Some(kind), Some(message)) => Some(format!("{kind}: {message}")),
            (None, Some(message)) => Some(message),
            (Some(kind), None) => Some(kind),
            (None, None) => None,
        })
        .unwrap_or_else(|| body_preview(body));
    let message = if message.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        message
    };
    PaymentProviderError::api(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
