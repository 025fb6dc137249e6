//! Stripe webhook signature verification.
//!
//! The `Stripe-Signature` header carries a timestamp and one or more `v1`
//! HMAC-SHA256 signatures over `"{timestamp}.{payload}"`, keyed with the
//! endpoint's signing secret.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::dto::EventDto;
use crate::domain::ProviderEvent;
use crate::domain::ports::PaymentProviderError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed timestamp before the event is rejected.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Parsed `Stripe-Signature` header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<SignatureHeader<'_>, PaymentProviderError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                let parsed = value.parse::<i64>().map_err(|_| {
                    PaymentProviderError::signature_invalid("timestamp is not an integer")
                })?;
                timestamp = Some(parsed);
            }
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| PaymentProviderError::signature_invalid("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(PaymentProviderError::signature_invalid(
            "missing v1 signature",
        ));
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Verifies webhook signatures for one endpoint secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Zeroizing<String>,
    tolerance: Duration,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl WebhookVerifier {
    /// Verifier for endpoint secret `secret` with the default 300 s tolerance.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Maximum age of a signed timestamp.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use subscriber_api::outbound::stripe::WebhookVerifier;
    ///
    /// let verifier = WebhookVerifier::new("whsec_doc").with_tolerance(Duration::from_secs(10));
    /// let header = verifier.header_for(b"{}", 1_000).unwrap();
    /// assert!(verifier.verify_at(b"{}", &header, 1_010).is_ok());
    /// assert!(verifier.verify_at(b"{}", &header, 1_011).is_err());
    /// ```
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn mac(&self) -> Result<HmacSha256, PaymentProviderError> {
        HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|err| PaymentProviderError::signature_invalid(err.to_string()))
    }

    /// Compute the `v1` signature for `payload` signed at `timestamp`.
    ///
    /// # Errors
    ///
    /// Fails only if the HMAC key is rejected.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, PaymentProviderError> {
        let mut mac = self.mac()?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Build a complete header value, as the provider would send it.
    ///
    /// # Errors
    ///
    /// See [`WebhookVerifier::sign`].
    pub fn header_for(&self, payload: &[u8], timestamp: i64) -> Result<String, PaymentProviderError> {
        Ok(format!("t={timestamp},v1={}", self.sign(payload, timestamp)?))
    }

    /// Check `header` against `payload` relative to `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`PaymentProviderError::SignatureInvalid`] when the header is
    /// malformed, the timestamp is outside the tolerance, or no `v1`
    /// signature matches.
    pub fn verify_at(
        &self,
        payload: &[u8],
        header: &str,
        now: i64,
    ) -> Result<(), PaymentProviderError> {
        let parsed = parse_header(header)?;

        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);
        if now.saturating_sub(parsed.timestamp) > tolerance {
            return Err(PaymentProviderError::signature_invalid(
                "timestamp outside the tolerance zone",
            ));
        }

        let mut signed = self.mac()?;
        signed.update(parsed.timestamp.to_string().as_bytes());
        signed.update(b".");
        signed.update(payload);

        let matched = parsed.signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|bytes| signed.clone().verify_slice(&bytes).is_ok())
                .unwrap_or(false)
        });
        if matched {
            Ok(())
        } else {
            Err(PaymentProviderError::signature_invalid(
                "no signature matches the payload",
            ))
        }
    }

    /// Verify against the current clock and decode the event.
    ///
    /// # Errors
    ///
    /// Signature failures surface as `SignatureInvalid`; a verified body that
    /// is not a decodable event surfaces as `InvalidPayload`.
    pub fn verify_event(
        &self,
        payload: &[u8],
        header: &str,
    ) -> Result<ProviderEvent, PaymentProviderError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())?;
        decode_event(payload)
    }
}

fn decode_event(payload: &[u8]) -> Result<ProviderEvent, PaymentProviderError> {
    let event: EventDto = serde_json::from_slice(payload)
        .map_err(|err| PaymentProviderError::invalid_payload(err.to_string()))?;
    event
        .into_domain()
        .map_err(PaymentProviderError::invalid_payload)
}
