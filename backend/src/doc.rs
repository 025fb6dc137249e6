//! OpenAPI documentation.
//!
//! [`ApiDoc`] is served by Swagger UI in debug builds and printed by the
//! `openapi-dump` binary for external tooling.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::users::{CheckoutSessionResponse, UserRequest, UserResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subscriber API",
        description = "User management with hosted subscription checkout and provider webhooks."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::create_checkout_session,
        crate::inbound::http::webhooks::receive_webhook,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserRequest,
        UserResponse,
        CheckoutSessionResponse,
        Error,
        ErrorCode
    )),
    tags(
        (name = "users", description = "User records"),
        (name = "billing", description = "Subscription checkout and provider webhooks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
