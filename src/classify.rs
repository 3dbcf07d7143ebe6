use crate::{AttemptOutcome, RetryPolicy};

/// HTTP statuses treated as transient.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Verdict for the attempt that just completed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryDecision {
    Retry,
    Stop,
}

pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Decides whether the request should be attempted again.
///
/// `attempt` is zero-based: `0` is the first try, so a policy allowing `n`
/// retries permits at most `n + 1` attempts in total.
pub fn decide(outcome: &AttemptOutcome, attempt: u32, policy: &RetryPolicy) -> RetryDecision {
    if !policy.is_enabled() || attempt >= policy.max_retries() {
        return RetryDecision::Stop;
    }

    match outcome {
        AttemptOutcome::Success { .. } => RetryDecision::Stop,
        AttemptOutcome::HttpFailure { status, .. } if is_retryable_status(*status) => {
            RetryDecision::Retry
        }
        AttemptOutcome::TransportFailure(failure) if failure.is_connection_failure() => {
            RetryDecision::Retry
        }
        _ => RetryDecision::Stop,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{decide, RetryDecision, RETRYABLE_STATUSES};
    use crate::{AttemptOutcome, RetryPolicy, TransportFailure};

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, 10, 1_000).expect("valid policy")
    }

    #[test]
    fn success_always_stops() {
        let outcome = AttemptOutcome::success(200, "{}");
        assert_eq!(decide(&outcome, 0, &policy(3)), RetryDecision::Stop);
    }

    #[test]
    fn connection_failures_retry() {
        let outcome = AttemptOutcome::TransportFailure(TransportFailure::connect("refused"));
        assert_eq!(decide(&outcome, 0, &policy(3)), RetryDecision::Retry);
        assert_eq!(decide(&outcome, 3, &policy(3)), RetryDecision::Stop);
    }

    #[test]
    fn transport_failure_carrying_response_stops() {
        let outcome =
            AttemptOutcome::TransportFailure(TransportFailure::other("body read").with_status(503));
        assert_eq!(decide(&outcome, 0, &policy(3)), RetryDecision::Stop);
    }

    #[test]
    fn unrecognised_transport_failure_stops() {
        let outcome = AttemptOutcome::TransportFailure(TransportFailure::other("builder"));
        assert_eq!(decide(&outcome, 0, &policy(3)), RetryDecision::Stop);
    }

    #[test]
    fn disabled_policy_never_retries() {
        let outcome = AttemptOutcome::http_failure(503, "");
        assert_eq!(
            decide(&outcome, 0, &RetryPolicy::disabled()),
            RetryDecision::Stop
        );
    }

    proptest! {
        #[test]
        fn retryable_statuses_retry_until_budget_is_spent(
            index in 0..RETRYABLE_STATUSES.len(),
            max_retries in 0u32..=10,
            attempt in 0u32..20,
        ) {
            let outcome = AttemptOutcome::http_failure(RETRYABLE_STATUSES[index], "");
            let expected = if attempt < max_retries {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            };
            prop_assert_eq!(decide(&outcome, attempt, &policy(max_retries)), expected);
        }

        #[test]
        fn other_statuses_always_stop(status in 100u16..600, attempt in 0u32..10) {
            prop_assume!(!RETRYABLE_STATUSES.contains(&status));
            let outcome = AttemptOutcome::http_failure(status, "");
            prop_assert_eq!(decide(&outcome, attempt, &policy(10)), RetryDecision::Stop);
        }
    }
}
