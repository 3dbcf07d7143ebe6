use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    ApiTransport, ClientOptions, DelayCalculator, DrawResult, GameType, HttpTransport,
    LotteryError, Params, RequestDescriptor, Result, ResultsPage, ResultsQuery,
    RetryingExecutor, TicketCheck, TicketCheckResult, UpcomingDraw,
};

/// Base URL used when none is given.
pub const DEFAULT_BASE_URL: &str = "https://api.lotterydata.io/v1";
pub const API_KEY_ENV: &str = "LOTTERY_API_KEY";
pub const BASE_URL_ENV: &str = "LOTTERY_API_BASE_URL";

/// Client for the lottery results and draws API.
///
/// Every resource method goes through the same [`RetryingExecutor`], so rate
/// limiting, server errors and connection failures are retried according to the
/// configured [`RetryPolicy`](crate::RetryPolicy).
#[derive(Clone, Debug)]
pub struct LotteryClient<T = HttpTransport> {
    executor: RetryingExecutor<T>,
    cancellation: Option<CancellationToken>,
}

impl LotteryClient<HttpTransport> {
    /// Creates a client for [`DEFAULT_BASE_URL`].
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let options = ClientOptions::default();
        let transport = HttpTransport::new(
            base_url,
            api_key,
            Duration::from_millis(options.timeout_ms),
        );
        Self::with_transport(transport, options)
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `LOTTERY_API_KEY`: API key (required)
    /// - `LOTTERY_API_BASE_URL`: base URL, defaults to [`DEFAULT_BASE_URL`]
    /// - the `LOTTERY_API_*` variables read by [`ClientOptions::from_env`]
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lotterydata_http::LotteryClient;
    ///
    /// let client = LotteryClient::from_env().expect("missing LOTTERY_API_KEY");
    /// ```
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LotteryError::Configuration(format!("{API_KEY_ENV} is missing or empty"))
            })?;
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        Ok(Self::with_base_url(base_url, api_key).with_options(ClientOptions::from_env()?))
    }

    /// Applies timeout and retry options.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.executor
            .transport_mut()
            .set_timeout(Duration::from_millis(options.timeout_ms));
        self.executor = self.executor.with_policy(options.retry);
        self
    }
}

impl<T: ApiTransport> LotteryClient<T> {
    /// Creates a client over a custom transport.
    ///
    /// The transport decides the timeout; only `options.retry` is used here.
    pub fn with_transport(transport: T, options: ClientOptions) -> Self {
        Self {
            executor: RetryingExecutor::new(transport, options.retry),
            cancellation: None,
        }
    }

    /// Aborts in-flight calls with [`LotteryError::Cancelled`] once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_delay_calculator(mut self, delays: DelayCalculator) -> Self {
        self.executor = self.executor.with_delay_calculator(delays);
        self
    }

    pub fn executor(&self) -> &RetryingExecutor<T> {
        &self.executor
    }

    /// Latest completed draw of `game`.
    pub async fn latest_result(&self, game: GameType) -> Result<DrawResult> {
        self.get(&format!("/results/{game}/latest"), ()).await
    }

    /// Historical results of `game`, filtered and paginated by `query`.
    pub async fn results(&self, game: GameType, query: &ResultsQuery) -> Result<ResultsPage> {
        self.get(&format!("/results/{game}"), query.to_params()).await
    }

    /// Result of the `game` draw held on `date`.
    pub async fn result_on(&self, game: GameType, date: NaiveDate) -> Result<DrawResult> {
        self.get(&format!("/results/{game}/{}", date.format("%Y-%m-%d")), ())
            .await
    }

    /// Compares ticket numbers against a draw.
    pub async fn check_ticket(
        &self,
        game: GameType,
        ticket: &TicketCheck,
    ) -> Result<TicketCheckResult> {
        if ticket.numbers.is_empty() {
            return Err(LotteryError::Configuration(
                "ticket check requires at least one number".to_owned(),
            ));
        }
        self.get(&format!("/results/{game}/check"), ticket.to_params())
            .await
    }

    /// Next scheduled draw of every game.
    pub async fn upcoming_draws(&self) -> Result<Vec<UpcomingDraw>> {
        self.get("/draws/upcoming", ()).await
    }

    pub async fn upcoming_draw(&self, game: GameType) -> Result<UpcomingDraw> {
        self.get(&format!("/draws/upcoming/{game}"), ()).await
    }

    /// `GET` on an arbitrary path, decoding the JSON body into `R`.
    pub async fn get<R, P>(&self, path: &str, params: P) -> Result<R>
    where
        R: DeserializeOwned,
        P: Into<Params>,
    {
        self.request(Method::GET, path, params).await
    }

    /// Sends a request through the retrying executor.
    ///
    /// Parameters go to the query string for `GET` and to a JSON body otherwise.
    pub async fn request<R, P>(&self, method: Method, path: &str, params: P) -> Result<R>
    where
        R: DeserializeOwned,
        P: Into<Params>,
    {
        let request = RequestDescriptor::new(method, path, params);
        let response = match &self.cancellation {
            Some(token) => {
                self.executor
                    .execute_with_cancellation(&request, token)
                    .await?
            }
            None => self.executor.execute(&request).await?,
        };
        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::{LotteryClient, DEFAULT_BASE_URL};
    use crate::{ClientOptions, RetryPolicy};

    #[test]
    fn default_client_targets_default_base_url() {
        let client = LotteryClient::new("key");
        assert_eq!(client.executor().transport().base_url(), DEFAULT_BASE_URL);
        assert_eq!(*client.executor().policy(), RetryPolicy::default());
    }

    #[test]
    fn options_update_timeout_and_policy() {
        let client = LotteryClient::with_base_url("http://localhost:1", "key").with_options(
            ClientOptions {
                timeout_ms: 250,
                retry: RetryPolicy::disabled(),
            },
        );
        assert_eq!(client.executor().transport().timeout().as_millis(), 250);
        assert!(!client.executor().policy().is_enabled());
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = LotteryClient::with_base_url("https://api.example.test", "secret-key");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }
}
