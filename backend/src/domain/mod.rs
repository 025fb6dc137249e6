//! Domain primitives, services and ports.
//!
//! Purpose: hold the user and subscription model plus the business rules
//! that guard it, independent of HTTP, SQL or the payment provider's wire
//! format.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, UserDetails, SubscriptionState: the stored user record.
//! - ProviderEvent and friends: payment provider vocabulary.
//! - UserService: implements the driving ports in [`ports`].

pub mod billing;
pub mod error;
pub mod ports;
mod subscription_service;
pub mod trace_id;
pub mod user;
mod user_service;

pub use self::billing::{
    CheckoutRequest, CheckoutSession, CheckoutSettings, ProviderEvent, SubscriptionSnapshot,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, SubscriptionState, SubscriptionStatus, User, UserDetails, UserDraft, UserId,
    UserName, UserValidationError,
};
pub use self::user_service::UserService;
