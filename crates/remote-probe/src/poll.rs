//! Bounded polling.
//!
//! Cluster state changes (a host draining, a daemon restarting, a health
//! warning clearing) are asynchronous: the only way to observe them is to
//! re-check at intervals, for a bounded amount of time. [`BoundedPoll`]
//! provides that loop shape without knowing anything about the condition
//! being waited on. The caller evaluates its own condition in the loop body
//! and breaks out when satisfied.
//!
//! # Example
//!
//! ```ignore
//! use remote_probe::poll::BoundedPoll;
//! use std::time::Duration;
//!
//! let mut poll = BoundedPoll::new(Duration::from_secs(300), Duration::from_secs(10));
//! while poll.tick().await.is_some() {
//!     if host_is_gone(&mut runner).await? {
//!         break;
//!     }
//! }
//! if poll.expired() {
//!     // the host never went away
//! }
//! ```

use std::time::Duration;

use tokio::time::{Instant, sleep};

/// A single iteration of a bounded poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Zero-based attempt number.
    pub attempt: u32,
    /// Time elapsed since the first tick.
    pub elapsed: Duration,
}

/// Snapshot of a poll's progress, finalized when the loop exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Time elapsed since the first tick.
    pub elapsed: Duration,
    /// Whether the poll ran to its timeout boundary without an early break.
    pub expired: bool,
    /// Number of ticks yielded so far.
    pub attempts: u32,
}

/// A finite, restartable sequence of polling ticks.
///
/// The first [`tick`](Self::tick) starts the clock and yields immediately.
/// Before every later tick the total elapsed time is checked against
/// `timeout`: once reached, the sequence ends and the poll is marked
/// [`expired`](Self::expired). Otherwise the poller sleeps `interval` and
/// yields again.
///
/// `expired()` is true only if the sequence ran to the timeout boundary.
/// Breaking out of the loop early leaves it false, which is how callers
/// distinguish "condition met" from "gave up".
///
/// The poller never inspects the caller's condition and offers no mid-tick
/// cancellation: if the check in the loop body blocks forever, the poller
/// cannot interrupt it.
#[derive(Debug)]
pub struct BoundedPoll {
    timeout: Duration,
    interval: Duration,
    started: Option<Instant>,
    expired: bool,
    attempts: u32,
}

impl BoundedPoll {
    /// Create a poller that yields ticks for at most `timeout`, sleeping
    /// `interval` between them.
    ///
    /// A zero `timeout` yields no ticks and is expired from the first call.
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            started: None,
            expired: false,
            attempts: 0,
        }
    }

    /// Yield the next tick, or `None` once the timeout boundary is reached.
    pub async fn tick(&mut self) -> Option<Tick> {
        if self.expired {
            return None;
        }

        let Some(started) = self.started else {
            if self.timeout.is_zero() {
                self.expired = true;
                return None;
            }
            self.started = Some(Instant::now());
            self.attempts = 1;
            return Some(Tick {
                attempt: 0,
                elapsed: Duration::ZERO,
            });
        };

        if started.elapsed() >= self.timeout {
            self.expired = true;
            return None;
        }

        sleep(self.interval).await;

        let attempt = self.attempts;
        self.attempts += 1;
        Some(Tick {
            attempt,
            elapsed: started.elapsed(),
        })
    }

    /// Whether the poll ran to its timeout boundary without an early break.
    #[must_use]
    pub const fn expired(&self) -> bool {
        self.expired
    }

    /// Time elapsed since the first tick (zero before the sequence starts).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Number of ticks yielded so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The configured sleep between ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Snapshot the poll's progress.
    #[must_use]
    pub fn outcome(&self) -> PollOutcome {
        PollOutcome {
            elapsed: self.elapsed(),
            expired: self.expired,
            attempts: self.attempts,
        }
    }

    /// Restart the sequence from scratch, keeping timeout and interval.
    pub const fn reset(&mut self) {
        self.started = None;
        self.expired = false;
        self.attempts = 0;
    }
}
