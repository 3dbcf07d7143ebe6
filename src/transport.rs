use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};

use crate::{AttemptOutcome, RequestDescriptor, TransportFailure};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Performs a single HTTP attempt.
///
/// Implementations must report any received response, error statuses included,
/// as [`AttemptOutcome::Success`] or [`AttemptOutcome::HttpFailure`], and use
/// [`AttemptOutcome::TransportFailure`] only when no usable response exists.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn attempt(&self, request: &RequestDescriptor) -> AttemptOutcome;
}

#[async_trait]
impl<T: ApiTransport + ?Sized> ApiTransport for std::sync::Arc<T> {
    async fn attempt(&self, request: &RequestDescriptor) -> AttemptOutcome {
        (**self).attempt(request).await
    }
}

/// `reqwest`-backed transport owning the base URL, credentials and timeout.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, api_key, timeout)
    }

    /// Uses a preconfigured `reqwest::Client` (proxies, TLS roots, pooling).
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into().trim().to_owned(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn build(&self, request: &RequestDescriptor) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url(&self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(self.timeout);

        if request.sends_body() {
            builder = builder.json(&request.params().to_json_body());
        } else if !request.params().is_empty() {
            builder = builder.query(&request.params().to_query_pairs());
        }
        builder
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn attempt(&self, request: &RequestDescriptor) -> AttemptOutcome {
        let response = match self.build(request).send().await {
            Ok(response) => response,
            Err(err) => {
                return AttemptOutcome::TransportFailure(TransportFailure::from_reqwest(&err))
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return AttemptOutcome::TransportFailure(
                    TransportFailure::from_reqwest(&err).with_status(status.as_u16()),
                )
            }
        };

        if status.is_success() {
            AttemptOutcome::Success {
                status: status.as_u16(),
                body,
            }
        } else {
            AttemptOutcome::HttpFailure {
                status: status.as_u16(),
                headers,
                body,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Method;

    use super::{HttpTransport, API_KEY_HEADER};
    use crate::{Params, RequestDescriptor, Value};

    fn transport() -> HttpTransport {
        HttpTransport::new(
            "https://api.example.test/v1",
            " key-123 ",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn get_sends_comma_joined_query_and_headers() {
        let request = RequestDescriptor::get(
            "/results/powerball/check",
            Params::new().with("numbers", Value::list([1, 2, 3])),
        );
        let built = transport().build(&request).build().expect("request must build");

        assert_eq!(built.method(), &Method::GET);
        assert_eq!(
            built.url().as_str(),
            "https://api.example.test/v1/results/powerball/check?numbers=1%2C2%2C3"
        );
        assert_eq!(built.headers()[API_KEY_HEADER], "key-123");
        assert_eq!(built.headers()["accept"], "application/json");
        assert!(built.body().is_none());
    }

    #[test]
    fn post_sends_json_body() {
        let request = RequestDescriptor::new(
            Method::POST,
            "results/powerball/check",
            Params::new().with("numbers", vec![7, 9]),
        );
        let built = transport().build(&request).build().expect("request must build");

        assert!(built.url().query().is_none());
        let body = built
            .body()
            .and_then(|body| body.as_bytes())
            .expect("json body");
        assert_eq!(body, br#"{"numbers":[7,9]}"#);
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", transport());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("key-123"));
    }
}
