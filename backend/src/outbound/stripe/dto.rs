//! DTOs for decoding Stripe API responses and webhook events.
//!
//! Responses decode into these transport shapes first and are mapped into
//! domain records in one pass.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{CheckoutSession, ProviderEvent, SubscriptionSnapshot, SubscriptionStatus};

const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

/// Reference field that Stripe returns either as a bare id or, when
/// expanded, as the full object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ExpandableDto {
    Id(String),
    Object { id: String },
}

impl ExpandableDto {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CustomerDto {
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CheckoutSessionDto {
    pub(super) id: String,
    pub(super) url: Option<String>,
}

impl CheckoutSessionDto {
    pub(super) fn into_domain(self) -> Result<CheckoutSession, String> {
        let url = self
            .url
            .ok_or_else(|| format!("checkout session {} has no url", self.id))?;
        Ok(CheckoutSession { id: self.id, url })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SubscriptionItemDto {
    pub(super) current_period_end: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SubscriptionItemsDto {
    #[serde(default)]
    pub(super) data: Vec<SubscriptionItemDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SubscriptionDto {
    pub(super) id: String,
    pub(super) customer: ExpandableDto,
    pub(super) status: String,
    /// Older API versions report the period end on the subscription itself.
    pub(super) current_period_end: Option<i64>,
    /// Newer API versions report it per item.
    #[serde(default)]
    pub(super) items: SubscriptionItemsDto,
}

impl SubscriptionDto {
    pub(super) fn into_domain(self) -> Result<SubscriptionSnapshot, String> {
        let period_end = self
            .current_period_end
            .or_else(|| self.items.data.iter().find_map(|item| item.current_period_end));
        let current_period_end = period_end.map(to_datetime).transpose()?;
        Ok(SubscriptionSnapshot {
            id: self.id,
            customer_ref: self.customer.into_id(),
            status: SubscriptionStatus::from(self.status.as_str()),
            current_period_end,
        })
    }
}

fn to_datetime(seconds: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| format!("timestamp {seconds} out of range"))
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObjectDto {
    customer: Option<ExpandableDto>,
    subscription: Option<ExpandableDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EventDataDto {
    pub(super) object: Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct EventDto {
    pub(super) id: String,
    #[serde(rename = "type")]
    pub(super) event_type: String,
    pub(super) data: EventDataDto,
}

impl EventDto {
    /// Decode the embedded object according to the event type.
    pub(super) fn into_domain(self) -> Result<ProviderEvent, String> {
        let Self {
            id,
            event_type,
            data,
        } = self;
        let decode_error = |err: serde_json::Error| format!("event {id} ({event_type}): {err}");

        match event_type.as_str() {
            CHECKOUT_COMPLETED => {
                let session: CheckoutSessionObjectDto =
                    serde_json::from_value(data.object).map_err(decode_error)?;
                Ok(ProviderEvent::CheckoutCompleted {
                    customer_ref: session.customer.map(ExpandableDto::into_id),
                    subscription_ref: session.subscription.map(ExpandableDto::into_id),
                })
            }
            SUBSCRIPTION_UPDATED | SUBSCRIPTION_DELETED => {
                let subscription: SubscriptionDto =
                    serde_json::from_value(data.object).map_err(decode_error)?;
                let snapshot = subscription.into_domain()?;
                if event_type == SUBSCRIPTION_UPDATED {
                    Ok(ProviderEvent::SubscriptionUpdated(snapshot))
                } else {
                    Ok(ProviderEvent::SubscriptionDeleted(snapshot))
                }
            }
            _ => Ok(ProviderEvent::Unrecognized { event_type }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBodyDto {
    pub(super) message: Option<String>,
    #[serde(rename = "type")]
    pub(super) error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDto {
    pub(super) error: ApiErrorBodyDto,
}
