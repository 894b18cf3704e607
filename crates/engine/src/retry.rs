use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use common::{Interval, PriceSeriesProvider, ProviderError, Series};

/// Bounded retry schedule for price fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub rate_limit_backoff: Duration,
    pub error_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_backoff: Duration::from_secs(15),
            error_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            rate_limit_backoff: Duration::ZERO,
            error_backoff: Duration::ZERO,
        }
    }

    pub fn backoff_for(&self, err: &ProviderError) -> Duration {
        if err.is_rate_limit() {
            self.rate_limit_backoff
        } else {
            self.error_backoff
        }
    }
}

/// Provider decorator that retries transient failures.
///
/// Symbol, key and rejection errors are returned on the first attempt.
pub struct Retrying<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> Retrying<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<P: PriceSeriesProvider> PriceSeriesProvider for Retrying<P> {
    async fn fetch(&self, symbol: &str, interval: Interval) -> Result<Series, ProviderError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.fetch(symbol, interval).await {
                Ok(series) => return Ok(series),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let backoff = self.policy.backoff_for(&e);
                    warn!(
                        symbol,
                        attempt,
                        max_attempts = attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Price fetch failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted results, then reports an empty series.
    struct Scripted {
        script: Mutex<VecDeque<Result<Series, ProviderError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(script: Vec<Result<Series, ProviderError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PriceSeriesProvider for Scripted {
        async fn fetch(&self, _symbol: &str, _interval: Interval) -> Result<Series, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Series::default()))
        }
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let inner = Scripted::new(vec![
            Err(ProviderError::Timeout),
            Err(ProviderError::RateLimited("note".into())),
        ]);
        let provider = Retrying::new(inner, RetryPolicy::immediate(3));
        assert!(provider.fetch("EURUSD", Interval::FiveMinutes).await.is_ok());
        assert_eq!(provider.inner.calls(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let inner = Scripted::new(vec![
            Err(ProviderError::Http("502".into())),
            Err(ProviderError::Http("502".into())),
            Err(ProviderError::Http("502".into())),
            Ok(Series::default()),
        ]);
        let provider = Retrying::new(inner, RetryPolicy::immediate(3));
        let err = provider.fetch("EURUSD", Interval::FiveMinutes).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
        assert_eq!(provider.inner.calls(), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        for err in [
            ProviderError::InvalidSymbol("EUR".into()),
            ProviderError::MissingApiKey,
            ProviderError::Rejected("Invalid API call.".into()),
        ] {
            let provider = Retrying::new(Scripted::new(vec![Err(err)]), RetryPolicy::immediate(5));
            assert!(provider.fetch("EUR", Interval::OneMinute).await.is_err());
            assert_eq!(provider.inner.calls(), 1);
        }
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let provider = Retrying::new(
            Scripted::new(vec![Err(ProviderError::Timeout)]),
            RetryPolicy::immediate(0),
        );
        assert!(provider.fetch("EURUSD", Interval::OneMinute).await.is_err());
        assert_eq!(provider.inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_wait_longer_than_other_errors() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.backoff_for(&ProviderError::RateLimited("n".into())),
            Duration::from_secs(15)
        );
        assert_eq!(policy.backoff_for(&ProviderError::Timeout), Duration::from_secs(5));

        let provider = Retrying::new(
            Scripted::new(vec![Err(ProviderError::RateLimited("n".into()))]),
            policy,
        );
        let started = tokio::time::Instant::now();
        assert!(provider.fetch("EURUSD", Interval::OneMinute).await.is_ok());
        assert!(started.elapsed() >= Duration::from_secs(15));
    }
}
