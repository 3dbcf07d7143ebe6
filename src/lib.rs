//! `lotterydata-http` is an async HTTP client for a lottery results and
//! upcoming draws API.
//!
//! Resource methods live on [`LotteryClient`]:
//! - [`LotteryClient::latest_result`]
//! - [`LotteryClient::results`]
//! - [`LotteryClient::check_ticket`]
//! - [`LotteryClient::upcoming_draws`]
//!
//! Every call runs through a [`RetryingExecutor`], which retries rate limiting
//! (429), server errors (500, 502, 503, 504) and connection failures with
//! exponential backoff and jitter, honoring `Retry-After` when the server sends
//! it.

mod backoff;
mod classify;
mod client;
mod error;
mod executor;
mod options;
mod outcome;
mod params;
mod policy;
mod request;
mod transport;
mod types;
mod value;
mod wire;

pub use backoff::{DelayCalculator, JITTER_FACTOR};
pub use classify::{decide, is_retryable_status, RetryDecision, RETRYABLE_STATUSES};
pub use client::{LotteryClient, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{ApiError, LotteryError, NETWORK_ERROR_CODE, UNKNOWN_ERROR_CODE};
pub use executor::RetryingExecutor;
pub use options::ClientOptions;
pub use outcome::{ApiResponse, AttemptOutcome, FailureKind, TransportFailure};
pub use params::Params;
pub use policy::{RetryPolicy, MAX_RETRIES_LIMIT};
pub use request::RequestDescriptor;
pub use transport::{ApiTransport, HttpTransport, API_KEY_HEADER};
pub use types::{
    DrawResult, GameType, ResultsPage, ResultsQuery, TicketCheck, TicketCheckResult,
    UpcomingDraw,
};
pub use value::Value;

pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, LotteryError>;
