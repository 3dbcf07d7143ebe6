use serde_json::{Map, Value as JsonValue};

/// Error code used when no HTTP response was ever obtained.
pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";
/// Error code used when the error envelope carries no code.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
pub(crate) const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Terminal failure of a request after retries were exhausted or skipped.
///
/// Built once from the last attempt of a request: either from the API's error
/// envelope, or synthesized when the server was never reached (status `0`).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{code} ({status_code}): {message}")]
pub struct ApiError {
    /// Human readable message from the API (or the transport).
    pub message: String,
    /// Machine readable error code, e.g. `RATE_LIMITED`.
    pub code: String,
    /// HTTP status of the final response, `0` when no response was obtained.
    pub status_code: u16,
    /// Optional structured details attached by the API.
    pub details: Option<Map<String, JsonValue>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            status_code,
            details: None,
        }
    }

    /// Builds the error reported when the server could not be reached at all.
    pub fn network(cause: impl Into<String>) -> Self {
        Self::new(
            format!("Network error: {}", cause.into()),
            NETWORK_ERROR_CODE,
            0,
        )
    }

    pub fn with_details(mut self, details: Map<String, JsonValue>) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns `true` when no HTTP response backs this error.
    pub fn is_network(&self) -> bool {
        self.status_code == 0
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum LotteryError {
    /// Invalid retry policy, client options or environment configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The API answered with an error status.
    #[error("api error: {0}")]
    Api(ApiError),
    /// No HTTP response was obtained (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(ApiError),
    /// A success response whose body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// The request was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl LotteryError {
    /// Returns the API error value for `Api` and `Network` failures.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) | Self::Network(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of the terminal response; `0` for network failures.
    pub fn status_code(&self) -> Option<u16> {
        self.api_error().map(|err| err.status_code)
    }
}
