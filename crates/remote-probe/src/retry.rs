//! Caller-side retry policies.
//!
//! The execution primitives never retry anything themselves; a call-site
//! that wants retries wraps its own operation. Retryability is decided on
//! the structured error kind ([`ProbeError::is_retryable`]), never by
//! matching substrings of error messages.
//!
//! Attempt counts and delays are deliberately per-call-site: a flaky
//! subscription refresh and a cluster-wide rebalance do not want the same
//! numbers. The default mirrors a conservative exponential backoff.

use std::time::Duration;

use crate::error::{ProbeError, Result};

/// Retry strategy.
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// No retries.
    None,
    /// Fixed delay between retries.
    Fixed {
        /// Delay between attempts.
        delay: Duration,
        /// Maximum attempts.
        max_attempts: u32,
    },
    /// Exponential backoff.
    Exponential {
        /// Initial delay.
        initial_delay: Duration,
        /// Maximum delay.
        max_delay: Duration,
        /// Multiplier for each attempt.
        multiplier: f64,
        /// Maximum attempts.
        max_attempts: u32,
    },
    /// Linear backoff.
    Linear {
        /// Initial delay.
        initial_delay: Duration,
        /// Increment per attempt.
        increment: Duration,
        /// Maximum delay.
        max_delay: Duration,
        /// Maximum attempts.
        max_attempts: u32,
    },
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::Exponential {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 5,
        }
    }
}

impl RetryStrategy {
    /// Create no retry strategy.
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// Create fixed delay strategy.
    #[must_use]
    pub const fn fixed(delay: Duration, max_attempts: u32) -> Self {
        Self::Fixed {
            delay,
            max_attempts,
        }
    }

    /// Create exponential backoff strategy.
    #[must_use]
    pub const fn exponential(initial_delay: Duration, max_attempts: u32) -> Self {
        Self::Exponential {
            initial_delay,
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            max_attempts,
        }
    }

    /// Get delay for attempt (0-indexed), or `None` once attempts are spent.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed {
                delay,
                max_attempts,
            } => (attempt < *max_attempts).then_some(*delay),
            Self::Exponential {
                initial_delay,
                max_delay,
                multiplier,
                max_attempts,
            } => {
                if attempt < *max_attempts {
                    let delay = initial_delay.as_secs_f64() * multiplier.powi(attempt as i32);
                    Some(Duration::from_secs_f64(delay).min(*max_delay))
                } else {
                    None
                }
            }
            Self::Linear {
                initial_delay,
                increment,
                max_delay,
                max_attempts,
            } => {
                if attempt < *max_attempts {
                    let delay = *initial_delay + (*increment * attempt);
                    Some(delay.min(*max_delay))
                } else {
                    None
                }
            }
        }
    }

    /// Check if another attempt is allowed.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.delay_for_attempt(attempt).is_some()
    }

    /// Get max attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. }
            | Self::Exponential { max_attempts, .. }
            | Self::Linear { max_attempts, .. } => *max_attempts,
        }
    }
}

/// Retry state tracker.
#[derive(Debug)]
pub struct RetryState {
    attempt: u32,
    strategy: RetryStrategy,
    total_delay: Duration,
}

impl RetryState {
    /// Create new state.
    #[must_use]
    pub const fn new(strategy: RetryStrategy) -> Self {
        Self {
            attempt: 0,
            strategy,
            total_delay: Duration::ZERO,
        }
    }

    /// Get current attempt (0-indexed).
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Check if another attempt is allowed.
    #[must_use]
    pub fn should_retry(&self) -> bool {
        self.strategy.should_retry(self.attempt)
    }

    /// Get next delay.
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        self.strategy.delay_for_attempt(self.attempt)
    }

    /// Record an attempt.
    pub fn record_attempt(&mut self) {
        if let Some(delay) = self.next_delay() {
            self.total_delay += delay;
        }
        self.attempt += 1;
    }

    /// Get total delay so far.
    #[must_use]
    pub const fn total_delay(&self) -> Duration {
        self.total_delay
    }

    /// Reset state.
    pub const fn reset(&mut self) {
        self.attempt = 0;
        self.total_delay = Duration::ZERO;
    }
}

/// Run `op`, retrying per `strategy` while the failure kind is retryable.
///
/// Non-retryable failures (authentication, non-zero exits, configuration)
/// are returned immediately; the final error is returned once attempts are
/// spent.
pub async fn retry_with<T, F>(strategy: &RetryStrategy, mut op: F) -> Result<T>
where
    F: AsyncFnMut() -> Result<T>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => match strategy.delay_for_attempt(attempt) {
                Some(delay) => {
                    tracing::debug!(attempt, delay = ?delay, error = %e, "retrying after failure");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_strategy() {
        let strategy = RetryStrategy::fixed(Duration::from_millis(100), 3);

        assert!(strategy.should_retry(0));
        assert!(strategy.should_retry(2));
        assert!(!strategy.should_retry(3));
    }

    #[test]
    fn exponential_strategy_grows() {
        let strategy = RetryStrategy::exponential(Duration::from_millis(100), 3);

        let d0 = strategy.delay_for_attempt(0).unwrap();
        let d1 = strategy.delay_for_attempt(1).unwrap();
        let d2 = strategy.delay_for_attempt(2).unwrap();

        assert!(d1 > d0);
        assert!(d2 > d1);
    }

    #[test]
    fn retry_state() {
        let strategy = RetryStrategy::fixed(Duration::from_millis(100), 2);
        let mut state = RetryState::new(strategy);

        assert!(state.should_retry());
        state.record_attempt();
        assert!(state.should_retry());
        state.record_attempt();
        assert!(!state.should_retry());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_with_eventually_succeeds() {
        let strategy = RetryStrategy::fixed(Duration::from_millis(10), 5);
        let mut failures = 2;
        let result = retry_with(&strategy, async || {
            if failures > 0 {
                failures -= 1;
                Err(ProbeError::execution("transient"))
            } else {
                Ok(42)
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_with_gives_up() {
        let strategy = RetryStrategy::fixed(Duration::from_millis(10), 2);
        let mut calls = 0;
        let err = retry_with(&strategy, async || {
            calls += 1;
            Err::<(), _>(ProbeError::execution("always down"))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ProbeError::Execution { .. }));
        // Initial attempt plus two retries.
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_with_stops_on_non_retryable() {
        let strategy = RetryStrategy::fixed(Duration::from_millis(10), 5);
        let mut calls = 0;
        let err = retry_with(&strategy, async || {
            calls += 1;
            Err::<(), _>(ProbeError::authentication("qa", "bad key"))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ProbeError::Authentication { .. }));
        assert_eq!(calls, 1);
    }
}
