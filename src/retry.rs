//! Exponential backoff for translation document fetches.
//!
//! Only transient failures are retried; the caller decides which ones are
//! through a predicate (see `FetchError::is_transient`).

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first; zero behaves like one
    pub max_attempts: u32,
    /// Pause before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single pause
    pub max_delay: Duration,
    /// Growth factor applied to the pause after each retry
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Three attempts, pausing 250ms then 500ms.
    pub fn translation_fetch() -> Self {
        Self::new(3, Duration::from_millis(250)).with_max_delay(Duration::from_secs(2))
    }

    /// No retries at all.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Pause before the `retry`-th retry (1-based), capped at `max_delay`.
    fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::translation_fetch()
    }
}

/// Run `operation` until it succeeds, fails with an error `is_transient`
/// rejects, or the attempts run out. The last error is returned.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    what: &str,
    mut operation: F,
    is_transient: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let attempts = config.attempts();
    let mut retries = 0;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    debug!("{} succeeded after {} retries", what, retries);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !is_transient(&err) {
            debug!("{}: not retrying permanent error: {}", what, err);
            return Err(err);
        }

        retries += 1;
        if retries >= attempts {
            if attempts > 1 {
                warn!("{}: giving up after {} attempts: {}", what, attempts, err);
            }
            return Err(err);
        }

        let pause = config.backoff(retries);
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            what, retries, attempts, err, pause
        );
        sleep(pause).await;
    }
}
