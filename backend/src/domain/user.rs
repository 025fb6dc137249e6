//! User data model and its subscription state.
//!
//! A user is created from a validated [`UserDetails`] pair. Subscription
//! fields start at their defaults and are only ever written by mirroring
//! what the payment provider reports.

use std::fmt;

use chrono::{DateTime, Utc};

/// Validation errors raised while building [`UserDetails`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must contain '@'")]
    EmailMissingAt,
}

impl UserValidationError {
    /// Name of the offending request field.
    pub fn field(self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::EmptyEmail | Self::EmailMissingAt => "email",
        }
    }

    /// Stable machine-readable code for adapters.
    pub fn code(self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::EmptyEmail => "empty_email",
            Self::EmailMissingAt => "invalid_email",
        }
    }
}

/// Store-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a store-assigned identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier as stored.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-blank user name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Non-blank email address containing `@`.
///
/// Only the minimal syntactic check is applied; deliverability is not
/// verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email.contains('@') {
            return Err(UserValidationError::EmailMissingAt);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Unvalidated name and email as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    /// Display name, untrimmed.
    pub name: String,
    /// Contact email, untrimmed.
    pub email: String,
}

/// Validated name and email; the only shape repositories accept for writes.
///
/// # Examples
/// ```
/// use subscriber_api::domain::{UserDetails, UserDraft, UserValidationError};
///
/// let ok = UserDetails::try_from(UserDraft {
///     name: "Ana".into(),
///     email: "ana@x.com".into(),
/// });
/// assert!(ok.is_ok());
///
/// let err = UserDetails::try_from(UserDraft {
///     name: "Ana".into(),
///     email: "ana.x.com".into(),
/// });
/// assert_eq!(err, Err(UserValidationError::EmailMissingAt));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    name: UserName,
    email: EmailAddress,
}

impl UserDetails {
    /// Pair an already validated name and email.
    pub fn new(name: UserName, email: EmailAddress) -> Self {
        Self { name, email }
    }

    /// Validated display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Validated contact email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

impl TryFrom<UserDraft> for UserDetails {
    type Error = UserValidationError;

    fn try_from(draft: UserDraft) -> Result<Self, Self::Error> {
        let name = UserName::new(draft.name)?;
        let email = EmailAddress::new(draft.email)?;
        Ok(Self { name, email })
    }
}

/// Subscription lifecycle status as reported by the payment provider.
///
/// Unknown provider values are preserved verbatim in [`Self::Other`] so the
/// local record always mirrors the remote one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubscriptionStatus {
    #[default]
    Inactive,
    Incomplete,
    IncompleteExpired,
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
    Paused,
    Other(String),
}

impl SubscriptionStatus {
    /// Wire and storage representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inactive => "inactive",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Unpaid => "unpaid",
            Self::Paused => "paused",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Whether a new checkout must be refused.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(value: &str) -> Self {
        match value {
            "inactive" => Self::Inactive,
            "incomplete" => Self::Incomplete,
            "incomplete_expired" => Self::IncompleteExpired,
            "trialing" => Self::Trialing,
            "active" => Self::Active,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            "unpaid" => Self::Unpaid,
            "paused" => Self::Paused,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four subscription fields stored alongside a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionState {
    /// Provider-side customer reference.
    pub customer_ref: Option<String>,
    /// Provider-side subscription reference.
    pub subscription_ref: Option<String>,
    /// Mirrored provider status; `inactive` until a webhook says otherwise.
    pub status: SubscriptionStatus,
    /// End of the current billing period.
    pub current_period_end: Option<DateTime<Utc>>,
}

/// Application user.
///
/// ## Invariants
/// - `id` is assigned by the store and never changes.
/// - `details` always satisfy [`UserDetails`] validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    details: UserDetails,
    subscription: SubscriptionState,
}

impl User {
    /// Assemble a user from stored parts.
    pub fn new(id: UserId, details: UserDetails, subscription: SubscriptionState) -> Self {
        Self {
            id,
            details,
            subscription,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        self.details.name()
    }

    /// Contact email.
    pub fn email(&self) -> &EmailAddress {
        self.details.email()
    }

    /// Name and email together, as written by `update`.
    pub fn details(&self) -> &UserDetails {
        &self.details
    }

    /// Mirrored subscription fields.
    pub fn subscription(&self) -> &SubscriptionState {
        &self.subscription
    }
}
