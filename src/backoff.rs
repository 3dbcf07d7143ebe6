use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::{rngs::StdRng, thread_rng, Rng as _};

use crate::{AttemptOutcome, RetryPolicy};

/// Fraction of the exponential delay used as symmetric jitter.
pub const JITTER_FACTOR: f64 = 0.1;

/// Obsolete HTTP-date layouts still accepted in `Retry-After` (RFC 850, asctime).
const LEGACY_HTTP_DATE_FORMATS: [&str; 2] =
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];

/// Computes how long to wait before the next attempt.
///
/// A `Retry-After` hint from the server wins over the backoff schedule. Without
/// one, the delay is `base_delay_ms * 2^attempt` with ±10% jitter. Both paths are
/// capped at the policy's `max_delay_ms`.
#[derive(Clone, Debug, Default)]
pub struct DelayCalculator {
    /// Seeded generator for jitter; the thread-local RNG when unset.
    rng: Option<Arc<Mutex<StdRng>>>,
}

impl DelayCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the random number generator used for jitter.
    ///
    /// Meant for tests that need deterministic delays. The generator is shared
    /// behind a mutex by every clone of this calculator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(Arc::new(Mutex::new(rng)));
        self
    }

    pub fn compute(&self, attempt: u32, outcome: &AttemptOutcome, policy: &RetryPolicy) -> Duration {
        let max_delay_ms = policy.max_delay_ms();

        if let Some(hint_ms) = outcome
            .retry_after()
            .and_then(|value| retry_after_millis(value, Utc::now()))
        {
            return Duration::from_millis(hint_ms.min(max_delay_ms));
        }

        let exponential = policy.base_delay_ms() as f64 * 2f64.powi(attempt.min(63) as i32);
        let jitter = self.unit_jitter() * JITTER_FACTOR * exponential;
        let delay_ms = (exponential + jitter).clamp(0.0, max_delay_ms as f64);

        Duration::from_millis(delay_ms as u64)
    }

    fn unit_jitter(&self) -> f64 {
        match &self.rng {
            Some(rng) => rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(-1.0..=1.0),
            None => thread_rng().gen_range(-1.0..=1.0),
        }
    }
}

/// Parses a `Retry-After` value into milliseconds.
///
/// Accepts delta-seconds (fractions allowed) or an HTTP-date in any of its three
/// forms; dates in the past yield zero. Returns `None` for anything else.
pub(crate) fn retry_after_millis(value: &str, now: DateTime<Utc>) -> Option<u64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds.saturating_mul(1_000));
    }
    if let Ok(seconds) = value.parse::<f64>() {
        return (seconds.is_finite() && seconds >= 0.0).then(|| (seconds * 1_000.0) as u64);
    }

    let date = parse_http_date(value)?;
    let millis = date.signed_duration_since(now).num_milliseconds().max(0);
    Some(millis as u64)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    LEGACY_HTTP_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
