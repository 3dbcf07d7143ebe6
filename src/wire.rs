use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{ApiError, UNKNOWN_ERROR_CODE, UNKNOWN_ERROR_MESSAGE};

/// `{"error": {...}}` envelope used by the API for every error response.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub details: Option<JsonValue>,
}

/// Builds the terminal error for an HTTP error response.
///
/// Missing or malformed envelope fields fall back to a generic code and message
/// and to the HTTP status of the response.
pub fn api_error_from_body(status: u16, body: &str) -> ApiError {
    let error = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .unwrap_or_default();

    let api_error = ApiError::new(
        error
            .message
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_owned()),
        error.code.unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_owned()),
        error.status_code.unwrap_or(status),
    );

    match error.details {
        Some(JsonValue::Object(details)) => api_error.with_details(details),
        _ => api_error,
    }
}
