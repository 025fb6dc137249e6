//! Users API handlers.
//!
//! ```text
//! POST   /users                       {"name":"Ana","email":"ana@x.com"}
//! GET    /users
//! GET    /users/{id}
//! PUT    /users/{id}                  {"name":"Ana","email":"ana@y.com"}
//! DELETE /users/{id}
//! POST   /users/{id}/checkout-session
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, SubscriptionStatus, User, UserDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_user_id;

/// Request body for creating or replacing a user.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    /// Display name; must not be blank.
    #[schema(example = "Ana")]
    pub name: String,
    /// Contact email; must contain `@`.
    #[schema(example = "ana@x.com")]
    pub email: String,
}

impl From<UserRequest> for UserDraft {
    fn from(value: UserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
        }
    }
}

/// User representation returned to clients.
///
/// Provider customer and subscription references stay server side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[schema(example = "inactive")]
    pub subscription_status: String,
    pub subscription_current_period_end: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_i64(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            subscription_status: user.subscription().status.as_str().to_owned(),
            subscription_current_period_end: user.subscription().current_period_end,
        }
    }
}

/// Body of a successful checkout session request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    #[schema(example = "https://checkout.stripe.com/c/pay/cs_test_123")]
    pub checkout_url: String,
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid name or email", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let id = state
        .users_command
        .create_user(UserDraft::from(request.clone()))
        .await?;
    info!(user_id = %id, "user created");

    Ok(HttpResponse::Created().json(UserResponse {
        id: id.as_i64(),
        name: request.name,
        email: request.email,
        subscription_status: SubscriptionStatus::default().as_str().to_owned(),
        subscription_current_period_end: None,
    }))
}

/// List every user ordered by identifier.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users_query.list_users().await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Identifier is not an integer", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path)?;
    let user = state.users_query.get_user(id).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Replace a user's name and email.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UserRequest,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Invalid identifier, name or email", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state
        .users_command
        .update_user(id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Identifier is not an integer", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users_command.delete_user(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Start a hosted checkout for the user's subscription.
#[utoipa::path(
    post,
    path = "/users/{id}/checkout-session",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutSessionResponse),
        (status = 400, description = "Identifier is not an integer", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 409, description = "Subscription already active", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["billing"],
    operation_id = "createCheckoutSession"
)]
#[post("/users/{id}/checkout-session")]
pub async fn create_checkout_session(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CheckoutSessionResponse>> {
    let id = parse_user_id(&path)?;
    let session = state.subscriptions.create_checkout_session(id).await?;
    Ok(web::Json(CheckoutSessionResponse {
        checkout_url: session.url,
    }))
}
