//! Retry with exponential backoff for API calls

use std::time::Duration;

use crate::http::{ApiError, http_config};

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...), saturating
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Retry a fallible API call with exponential backoff.
///
/// Retryable errors are logged and retried up to `max_retries` (from the
/// global [`HttpConfig`](crate::HttpConfig)). Returns the first success, or
/// the final error on exhaustion / non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    attempt_fn: impl FnMut() -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    retry_with(label, http_config().max_retries, backoff_duration, attempt_fn)
}

fn retry_with<T>(
    label: &str,
    max_retries: u32,
    backoff: impl Fn(u32) -> Duration,
    mut attempt_fn: impl FnMut() -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                let delay = backoff(attempt);
                log::warn!("{label}: attempt {attempt}/{max_retries} failed: {e}, retrying in {delay:?}");
                std::thread::sleep(delay);
            }
            Err(e) => {
                log::error!("{label}: failed permanently: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_wait(_: u32) -> Duration {
        Duration::ZERO
    }

    #[test]
    fn backoff_exponential() {
        assert_eq!(backoff_duration(1), Duration::from_secs(2));
        assert_eq!(backoff_duration(2), Duration::from_secs(4));
        assert_eq!(backoff_duration(3), Duration::from_secs(8));
    }

    #[test]
    fn backoff_saturates_on_large_attempts() {
        assert_eq!(backoff_duration(64), Duration::from_secs(u64::MAX));
        assert_eq!(backoff_duration(100), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn retries_transient_until_success() {
        let mut calls = 0;
        let result = retry_with("test", 3, no_wait, || {
            calls += 1;
            if calls < 3 {
                Err(ApiError::Http {
                    status: Some(503),
                    message: "busy".into(),
                })
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with("test", 2, no_wait, || {
            calls += 1;
            Err(ApiError::Http {
                status: Some(429),
                message: "slow down".into(),
            })
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn permanent_error_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with("test", 5, no_wait, || {
            calls += 1;
            Err(ApiError::Http {
                status: Some(401),
                message: "unauthorized".into(),
            })
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
