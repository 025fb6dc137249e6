//! Request validation helpers shared by handlers.

use serde_json::json;

use crate::domain::{Error, UserId};

/// Parse a `{id}` path segment into a [`UserId`].
///
/// Anything that is not a base-10 `i64` is rejected with
/// `details.code = "invalid_id"`.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse::<i64>().map(UserId::new).map_err(|_| {
        Error::invalid_request("user id must be an integer").with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_id",
        }))
    })
}
