//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after adding a migration.

diesel::table! {
    /// User records plus the mirrored subscription state.
    users (id) {
        /// Store-assigned primary key.
        id -> Int8,
        name -> Text,
        email -> Text,
        /// Payment provider customer reference.
        stripe_customer_id -> Nullable<Text>,
        /// Payment provider subscription reference.
        stripe_subscription_id -> Nullable<Text>,
        /// Provider status string; `inactive` until a checkout completes.
        subscription_status -> Text,
        subscription_current_period_end -> Nullable<Timestamptz>,
    }
}
