//! Prometheus scrape endpoint.

use actix_web::{HttpResponse, get, http::header, web};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::error;

/// Render every metric in the shared registry in the text exposition format.
#[get("/metrics")]
pub async fn metrics(registry: web::Data<Registry>) -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&registry.gather(), &mut buffer) {
        error!(error = %err, "failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, encoder.format_type().to_owned()))
        .body(buffer)
}
