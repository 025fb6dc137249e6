//! Payment provider webhook receiver.
//!
//! The raw body is kept as bytes because the signature covers the exact
//! payload the provider sent.

use actix_web::{HttpRequest, HttpResponse, post, web};
use serde_json::json;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Largest webhook body accepted before verification.
pub const MAX_WEBHOOK_BYTES: usize = 64 * 1024;

/// Receive a provider event.
///
/// A missing signature header is treated as a failed verification.
#[utoipa::path(
    post,
    path = "/webhooks/provider",
    request_body(content = String, content_type = "application/json", description = "Signed provider event"),
    params(("Stripe-Signature" = String, Header, description = "Provider signature header")),
    responses(
        (status = 200, description = "Event accepted"),
        (status = 400, description = "Signature verification failed", body = Error),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["billing"],
    operation_id = "receiveProviderWebhook"
)]
#[post("/webhooks/provider")]
pub async fn receive_webhook(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    state
        .subscriptions
        .handle_provider_webhook(body.as_ref(), signature)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}
