use std::future::Future;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    classify::{decide, RetryDecision},
    error::ApiError,
    wire, ApiResponse, ApiTransport, AttemptOutcome, DelayCalculator, LotteryError,
    RequestDescriptor, Result, RetryPolicy,
};

/// Runs a request through a transport, retrying transient failures.
///
/// Attempts for one call are strictly sequential. The executor holds no
/// per-call state, so concurrent calls proceed independently, each with its own
/// attempt counter.
#[derive(Clone, Debug)]
pub struct RetryingExecutor<T> {
    transport: T,
    policy: RetryPolicy,
    delays: DelayCalculator,
}

impl<T: ApiTransport> RetryingExecutor<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            delays: DelayCalculator::new(),
        }
    }

    /// Replaces the delay calculator, e.g. with one using a seeded RNG.
    pub fn with_delay_calculator(mut self, delays: DelayCalculator) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub async fn execute(&self, request: &RequestDescriptor) -> Result<ApiResponse> {
        self.run(request, None).await
    }

    /// Like [`execute`](Self::execute), but gives up with
    /// [`LotteryError::Cancelled`] as soon as `token` fires, whether an attempt
    /// or a backoff wait is in progress.
    pub async fn execute_with_cancellation(
        &self,
        request: &RequestDescriptor,
        token: &CancellationToken,
    ) -> Result<ApiResponse> {
        self.run(request, Some(token)).await
    }

    async fn run(
        &self,
        request: &RequestDescriptor,
        cancel: Option<&CancellationToken>,
    ) -> Result<ApiResponse> {
        let mut attempt = 0u32;
        loop {
            let outcome = until_cancelled(cancel, self.transport.attempt(request)).await?;

            if decide(&outcome, attempt, &self.policy) == RetryDecision::Stop {
                return finish(request, outcome, attempt);
            }

            let delay = self.delays.compute(attempt, &outcome, &self.policy);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                method = %request.method(),
                path = request.path(),
                attempt = attempt + 1,
                status = ?outcome.status(),
                reason = %outcome.reason(),
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );

            until_cancelled(cancel, sleep(delay)).await?;
            attempt += 1;
        }
    }
}

async fn until_cancelled<F: Future>(
    cancel: Option<&CancellationToken>,
    future: F,
) -> Result<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(LotteryError::Cancelled),
            output = future => Ok(output),
        },
        None => Ok(future.await),
    }
}

/// Turns the last outcome into the call's result.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn finish(request: &RequestDescriptor, outcome: AttemptOutcome, attempt: u32) -> Result<ApiResponse> {
    let err = match outcome {
        AttemptOutcome::Success { status, body } => return Ok(ApiResponse { status, body }),
        AttemptOutcome::HttpFailure { status, body, .. } => {
            LotteryError::Api(wire::api_error_from_body(status, &body))
        }
        AttemptOutcome::TransportFailure(failure) => match failure.status() {
            None => LotteryError::Network(ApiError::network(failure.message())),
            Some(status) => LotteryError::Api(ApiError::new(
                format!("Failed to read response: {}", failure.message()),
                "RESPONSE_READ_ERROR",
                status,
            )),
        },
    };

    #[cfg(feature = "tracing")]
    tracing::warn!(
        method = %request.method(),
        path = request.path(),
        attempts = attempt + 1,
        error = %err,
        "request failed"
    );

    Err(err)
}
