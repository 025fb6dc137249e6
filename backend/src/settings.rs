//! Server configuration loaded via OrthoConfig.
//!
//! Values layer from defaults, an optional config file, `SUBSCRIBER_*`
//! environment variables and CLI flags, in increasing precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::CheckoutSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_STRIPE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SUCCESS_URL: &str = "http://localhost:3000/success?session_id={CHECKOUT_SESSION_ID}";
const DEFAULT_CANCEL_URL: &str = "http://localhost:3000/cancel";

/// Errors raised when configured values cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid Stripe API base {value:?}: {message}")]
    StripeApiBase { value: String, message: String },
}

/// Application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SUBSCRIBER")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. Without it the server runs on fixtures.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Skip applying embedded migrations at startup.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
    /// Per-request deadline in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Stripe REST API root.
    pub stripe_api_base: Option<String>,
    /// Stripe secret API key.
    pub stripe_secret_key: Option<String>,
    /// Signing secret of the webhook endpoint.
    pub stripe_webhook_secret: Option<String>,
    /// Recurring price charged at checkout.
    pub stripe_price_id: Option<String>,
    /// Timeout for calls to Stripe, in seconds.
    pub stripe_timeout_secs: Option<u64>,
    /// Redirect after a completed checkout.
    pub checkout_success_url: Option<String>,
    /// Redirect after an abandoned checkout.
    pub checkout_cancel_url: Option<String>,
}

/// Stripe credentials extracted from [`AppSettings`].
///
/// Secrets are wiped from memory on drop.
pub struct StripeSettings {
    /// REST API root, `https://api.stripe.com` unless overridden.
    pub api_base: Url,
    /// Secret API key used as the bearer token.
    pub secret_key: Zeroizing<String>,
    /// Endpoint secret for webhook signatures.
    pub webhook_secret: Zeroizing<String>,
    /// Per-request timeout for API calls.
    pub timeout: Duration,
    /// Price and redirect URLs for checkout sessions.
    pub checkout: CheckoutSettings,
}

impl std::fmt::Debug for StripeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeSettings")
            .field("api_base", &self.api_base.as_str())
            .field("secret_key", &"<redacted>")
            .field("webhook_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("checkout", &self.checkout)
            .finish()
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl AppSettings {
    /// Return the listen address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// PostgreSQL URL, or `None` when unset or blank.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    /// Connection pool cap, default 10.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Per-request deadline, default 60 s and never below 1 s.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Checkout parameters, if a price is configured.
    pub fn checkout(&self) -> Option<CheckoutSettings> {
        let price_id = non_blank(self.stripe_price_id.as_ref())?;
        Some(CheckoutSettings {
            price_id: price_id.to_owned(),
            success_url: non_blank(self.checkout_success_url.as_ref())
                .unwrap_or(DEFAULT_SUCCESS_URL)
                .to_owned(),
            cancel_url: non_blank(self.checkout_cancel_url.as_ref())
                .unwrap_or(DEFAULT_CANCEL_URL)
                .to_owned(),
        })
    }

    /// Stripe settings when the secret key, webhook secret and price are
    /// all configured; `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::StripeApiBase`] when the API base is not a
    /// valid URL.
    pub fn stripe(&self) -> Result<Option<StripeSettings>, SettingsError> {
        let (Some(secret_key), Some(webhook_secret), Some(checkout)) = (
            non_blank(self.stripe_secret_key.as_ref()),
            non_blank(self.stripe_webhook_secret.as_ref()),
            self.checkout(),
        ) else {
            return Ok(None);
        };

        let raw_base = non_blank(self.stripe_api_base.as_ref()).unwrap_or(DEFAULT_STRIPE_API_BASE);
        let api_base = Url::parse(raw_base).map_err(|err| SettingsError::StripeApiBase {
            value: raw_base.to_owned(),
            message: err.to_string(),
        })?;

        Ok(Some(StripeSettings {
            api_base,
            secret_key: Zeroizing::new(secret_key.to_owned()),
            webhook_secret: Zeroizing::new(webhook_secret.to_owned()),
            timeout: Duration::from_secs(
                self.stripe_timeout_secs
                    .unwrap_or(DEFAULT_STRIPE_TIMEOUT_SECS)
                    .max(1),
            ),
            checkout,
        }))
    }
}
