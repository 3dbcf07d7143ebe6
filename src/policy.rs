use crate::{LotteryError, Result};

/// Upper bound accepted for [`RetryPolicy::max_retries`].
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Validated retry parameters shared read-only by every request of a client.
///
/// A policy can only be obtained through [`RetryPolicy::new`],
/// [`RetryPolicy::disabled`] or [`Default`], so an out-of-range instance never
/// exists.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    enabled: bool,
    max_retries: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    /// Creates an enabled policy.
    ///
    /// Fails with [`LotteryError::Configuration`] when `max_retries` exceeds
    /// [`MAX_RETRIES_LIMIT`] or `max_delay_ms` is below `base_delay_ms`.
    pub fn new(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Result<Self> {
        if max_retries > MAX_RETRIES_LIMIT {
            return Err(LotteryError::Configuration(format!(
                "max_retries must be between 0 and {MAX_RETRIES_LIMIT}, got {max_retries}"
            )));
        }
        if max_delay_ms < base_delay_ms {
            return Err(LotteryError::Configuration(format!(
                "max_delay_ms ({max_delay_ms}) must be greater than or equal to base_delay_ms ({base_delay_ms})"
            )));
        }

        Ok(Self {
            enabled: true,
            max_retries,
            base_delay_ms,
            max_delay_ms,
        })
    }

    /// Policy performing exactly one attempt per request.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RetryPolicy;
    use crate::LotteryError;

    #[test]
    fn accepts_bounds() {
        let policy = RetryPolicy::new(10, 0, 0).expect("limits are inclusive");
        assert!(policy.is_enabled());
        assert_eq!(policy.max_retries(), 10);
        assert_eq!(policy.max_delay_ms(), 0);
    }

    #[test]
    fn rejects_too_many_retries() {
        let err = RetryPolicy::new(15, 100, 1_000).expect_err("15 retries is out of range");
        assert!(matches!(err, LotteryError::Configuration(_)));
    }

    #[test]
    fn rejects_cap_below_base_delay() {
        let err = RetryPolicy::new(3, 2_000, 1_000).expect_err("cap below base");
        match err {
            LotteryError::Configuration(message) => assert!(message.contains("max_delay_ms")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn disabled_keeps_valid_defaults() {
        let policy = RetryPolicy::disabled();
        assert!(!policy.is_enabled());
        assert!(policy.max_delay_ms() >= policy.base_delay_ms());
    }
}
