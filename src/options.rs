use std::str::FromStr;

use crate::{LotteryError, Result, RetryPolicy};

pub const TIMEOUT_ENV: &str = "LOTTERY_API_TIMEOUT_MS";
pub const RETRY_ENABLED_ENV: &str = "LOTTERY_API_RETRY_ENABLED";
pub const MAX_RETRIES_ENV: &str = "LOTTERY_API_MAX_RETRIES";
pub const BASE_DELAY_ENV: &str = "LOTTERY_API_RETRY_BASE_DELAY_MS";
pub const MAX_DELAY_ENV: &str = "LOTTERY_API_RETRY_MAX_DELAY_MS";

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry policy shared by every request of the client.
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientOptions {
    /// Reads options from `LOTTERY_API_*` environment variables.
    ///
    /// Unset variables keep their defaults. Malformed values, or a combination
    /// that does not form a valid [`RetryPolicy`], are reported as
    /// [`LotteryError::Configuration`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let timeout_ms = parse_var(TIMEOUT_ENV, read(TIMEOUT_ENV))?.unwrap_or(defaults.timeout_ms);
        let enabled = match read(RETRY_ENABLED_ENV) {
            None => true,
            Some(value) => parse_flag(&value).ok_or_else(|| {
                LotteryError::Configuration(format!(
                    "{RETRY_ENABLED_ENV} must be a boolean, got '{value}'"
                ))
            })?,
        };

        let retry = if enabled {
            RetryPolicy::new(
                parse_var(MAX_RETRIES_ENV, read(MAX_RETRIES_ENV))?
                    .unwrap_or(defaults.retry.max_retries()),
                parse_var(BASE_DELAY_ENV, read(BASE_DELAY_ENV))?
                    .unwrap_or(defaults.retry.base_delay_ms()),
                parse_var(MAX_DELAY_ENV, read(MAX_DELAY_ENV))?
                    .unwrap_or(defaults.retry.max_delay_ms()),
            )?
        } else {
            RetryPolicy::disabled()
        };

        Ok(Self { timeout_ms, retry })
    }
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|value| {
            value.parse::<T>().map_err(|_| {
                LotteryError::Configuration(format!(
                    "{name} must be a non-negative integer, got '{value}'"
                ))
            })
        })
        .transpose()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{
        ClientOptions, BASE_DELAY_ENV, MAX_DELAY_ENV, MAX_RETRIES_ENV, RETRY_ENABLED_ENV,
        TIMEOUT_ENV,
    };
    use crate::{LotteryError, Result, RetryPolicy};

    fn options(vars: &[(&str, &str)]) -> Result<ClientOptions> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ClientOptions::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(options(&[]).expect("defaults"), ClientOptions::default());
    }

    #[test]
    fn reads_all_variables() {
        let opts = options(&[
            (TIMEOUT_ENV, "2500"),
            (MAX_RETRIES_ENV, "5"),
            (BASE_DELAY_ENV, "200"),
            (MAX_DELAY_ENV, " 4000 "),
        ])
        .expect("valid environment");

        assert_eq!(opts.timeout_ms, 2_500);
        assert_eq!(opts.retry, RetryPolicy::new(5, 200, 4_000).expect("valid policy"));
    }

    #[test]
    fn disabled_flag_wins() {
        let opts = options(&[(RETRY_ENABLED_ENV, "false"), (MAX_RETRIES_ENV, "99")])
            .expect("retry values ignored when disabled");
        assert_eq!(opts.retry, RetryPolicy::disabled());
    }

    #[test]
    fn malformed_values_are_configuration_errors() {
        assert!(matches!(
            options(&[(TIMEOUT_ENV, "soon")]),
            Err(LotteryError::Configuration(_))
        ));
        assert!(matches!(
            options(&[(RETRY_ENABLED_ENV, "maybe")]),
            Err(LotteryError::Configuration(_))
        ));
        assert!(matches!(
            options(&[(MAX_RETRIES_ENV, "15")]),
            Err(LotteryError::Configuration(_))
        ));
    }
}
