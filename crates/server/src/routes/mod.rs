use serde::de::DeserializeOwned;

use crate::error::ApiErr;

pub mod admin;
pub mod bot_settings;
pub mod health;
pub mod link;
pub mod sessions;

/// Deserialize a request body from raw JSON, mapping every shape mismatch
/// to a plain 400 rather than axum's mixed rejection statuses.
pub(crate) fn parse_body<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiErr> {
    serde_json::from_value(value)
        .map_err(|e| ApiErr::bad_request(format!("invalid request body: {e}")))
}
