//! HTTP inbound adapter exposing the REST endpoints.

pub mod error;
pub mod health;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod state;
pub mod users;
pub(crate) mod validation;
pub mod webhooks;

pub use error::{ApiResult, json_error_handler};

use actix_web::web;

/// Register every REST route together with the extractor configuration they
/// rely on.
///
/// Health probes, metrics and API docs are mounted by the server because
/// they depend on process-level state.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PayloadConfig::new(webhooks::MAX_WEBHOOK_BYTES))
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(users::create_checkout_session)
        .service(webhooks::receive_webhook);
}
