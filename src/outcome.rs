use std::error::Error as _;
use std::fmt;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;

use crate::{LotteryError, Result};

/// Result of a single HTTP attempt, as reported by an [`ApiTransport`].
///
/// [`ApiTransport`]: crate::ApiTransport
#[derive(Clone, Debug)]
pub enum AttemptOutcome {
    /// 2xx response.
    Success { status: u16, body: String },
    /// Any non-2xx response.
    HttpFailure {
        status: u16,
        headers: HeaderMap,
        body: String,
    },
    /// The attempt failed below HTTP.
    TransportFailure(TransportFailure),
}

impl AttemptOutcome {
    pub fn success(status: u16, body: impl Into<String>) -> Self {
        Self::Success {
            status,
            body: body.into(),
        }
    }

    pub fn http_failure(status: u16, body: impl Into<String>) -> Self {
        Self::HttpFailure {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// HTTP status if a response was obtained.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } | Self::HttpFailure { status, .. } => Some(*status),
            Self::TransportFailure(failure) => failure.status,
        }
    }

    /// Short description of why the attempt did not succeed, for logs.
    pub fn reason(&self) -> String {
        match self {
            Self::Success { status, .. } | Self::HttpFailure { status, .. } => {
                format!("status {status}")
            }
            Self::TransportFailure(failure) => {
                format!("{:?} failure: {}", failure.kind, failure.message)
            }
        }
    }

    /// Raw `Retry-After` header value of an error response.
    pub fn retry_after(&self) -> Option<&str> {
        match self {
            Self::HttpFailure { headers, .. } => headers
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::trim),
            _ => None,
        }
    }
}

/// Coarse classification of a transport-level failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// Connection could not be established (refused, DNS, TLS handshake).
    Connect,
    /// The request timed out before a response arrived.
    Timeout,
    /// Anything else: body read errors, builder errors, decoding.
    Other,
}

/// Failure that happened below the HTTP layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportFailure {
    kind: FailureKind,
    message: String,
    status: Option<u16>,
}

impl TransportFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Connect, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Other, message)
    }

    /// Attaches the status of a response that was already received.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Connection or timeout failure with no response behind it.
    pub fn is_connection_failure(&self) -> bool {
        self.status.is_none() && matches!(self.kind, FailureKind::Connect | FailureKind::Timeout)
    }

    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_connect() {
            FailureKind::Connect
        } else if err.is_timeout() {
            FailureKind::Timeout
        } else {
            FailureKind::Other
        };

        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            kind,
            message,
            status: err.status().map(|status| status.as_u16()),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Successful response handed back by the executor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            LotteryError::Decode(format!(
                "invalid response JSON: {err}; body: {}",
                body_excerpt(&self.body)
            ))
        })
    }
}

/// Longest body prefix quoted in decode errors.
const BODY_EXCERPT_LIMIT: usize = 512;

fn body_excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LIMIT {
        return body.to_owned();
    }
    let mut end = BODY_EXCERPT_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes total)", &body[..end], body.len())
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    use super::{AttemptOutcome, TransportFailure};
    use crate::LotteryError;

    #[test]
    fn retry_after_only_from_http_failures() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 5 "));
        let failure = AttemptOutcome::HttpFailure {
            status: 429,
            headers,
            body: String::new(),
        };
        assert_eq!(failure.retry_after(), Some("5"));
        assert_eq!(AttemptOutcome::success(200, "{}").retry_after(), None);
    }

    #[test]
    fn reason_names_status_or_failure_kind() {
        assert_eq!(AttemptOutcome::http_failure(503, "").reason(), "status 503");
        assert_eq!(
            AttemptOutcome::TransportFailure(TransportFailure::timeout("deadline elapsed")).reason(),
            "Timeout failure: deadline elapsed"
        );
    }

    #[test]
    fn transport_failure_with_status_is_not_a_connection_failure() {
        assert!(TransportFailure::connect("refused").is_connection_failure());
        assert!(TransportFailure::timeout("deadline").is_connection_failure());
        assert!(!TransportFailure::connect("refused")
            .with_status(502)
            .is_connection_failure());
        assert!(!TransportFailure::other("body").is_connection_failure());
    }

    #[test]
    fn malformed_success_body_is_decode_error() {
        let response = super::ApiResponse {
            status: 200,
            body: "not json".to_owned(),
        };
        let err = response
            .json::<serde_json::Value>()
            .expect_err("body is not JSON");
        assert!(matches!(err, LotteryError::Decode(_)));
    }

    #[test]
    fn decode_error_quotes_only_a_prefix_of_large_bodies() {
        let response = super::ApiResponse {
            status: 200,
            body: format!("<html>{}</html>", "é".repeat(10_000)),
        };
        let LotteryError::Decode(message) = response
            .json::<serde_json::Value>()
            .expect_err("body is not JSON")
        else {
            panic!("expected a decode error");
        };
        assert!(message.len() < 700, "message is {} bytes", message.len());
        assert!(message.ends_with("(20013 bytes total)"));
    }
}
