use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Added to the delay for every further retry (linear backoff)
    pub delay_step: Duration,
}

impl RetryConfig {
    /// Create a new retry configuration with a constant delay
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            delay_step: Duration::ZERO,
        }
    }

    /// Set the amount each successive retry waits longer than the previous one
    pub fn with_delay_step(mut self, step: Duration) -> Self {
        self.delay_step = step;
        self
    }

    /// Preset: translation backend calls (5 attempts)
    /// Delays: 1s, 1.5s, 2s, 2.5s = 7s total wait time
    pub fn translation() -> Self {
        Self::new(5, Duration::from_secs(1)).with_delay_step(Duration::from_millis(500))
    }

    /// Calculate the delay for a given attempt number (0-indexed)
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        self.initial_delay + self.delay_step * (attempt - 1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::translation()
    }
}

/// Run `operation` until it succeeds or `config.max_attempts` is used up.
///
/// The first attempt runs immediately; a `max_attempts` of 0 still makes that
/// one attempt. The last error is returned once every attempt has failed.
pub async fn with_retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}/{}", operation_name, attempt, attempts);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if attempt == attempts {
            warn!("{} gave up after {} attempts: {}", operation_name, attempts, error);
            return Err(error);
        }

        let delay = config.delay_for_attempt(attempt);
        warn!(
            "{} failed on attempt {}/{} ({}); retrying in {:?}",
            operation_name, attempt, attempts, error, delay
        );
        sleep(delay).await;
        attempt += 1;
    }
}
