//! Arrival-rate throttler
//!
//! Smooths bursty arrivals into a steady commit cadence. Every accepted event
//! gets a deferred commit time; the spacing between commits depends on how
//! many events are currently in flight:
//! - busy (`pending > threshold`): shorter delay, drains the backlog
//! - quiet (`pending < threshold / 2`): longer delay, spreads sparse events
//! - otherwise: the base delay
//!
//! Commits are spaced relative to the previous scheduled commit, not to the
//! arrival time, so a burst is released one by one.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

use crate::error::{Error, Result};
use crate::time::Millis;

/// Upper bound accepted for any throttle delay.
pub const DELAY_LIMIT: Duration = Duration::from_secs(60);

/// Tunable throttle constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleConfig {
    pub base_delay: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub pending_threshold: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(15),
            min_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(100),
            pending_threshold: 10,
        }
    }
}

impl ThrottleConfig {
    pub fn validate(self) -> Result<Self> {
        if self.min_delay <= self.base_delay
            && self.base_delay <= self.max_delay
            && self.max_delay <= DELAY_LIMIT
            && self.pending_threshold >= 1
        {
            Ok(self)
        } else {
            Err(Error::InvalidThrottle {
                base: self.base_delay,
                min: self.min_delay,
                max: self.max_delay,
                threshold: self.pending_threshold,
            })
        }
    }

    /// Delay before the next commit given `pending` in-flight events.
    pub fn delay_for(&self, pending: u32) -> Duration {
        if pending == 0 {
            return self.base_delay;
        }
        let threshold = self.pending_threshold;
        let scaled = || {
            let secs = self.base_delay.as_secs_f64() * threshold as f64 / pending as f64;
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        };

        if pending > threshold {
            scaled().max(self.min_delay)
        } else if (pending as f64) < threshold as f64 / 2.0 {
            scaled().min(self.max_delay)
        } else {
            self.base_delay
        }
    }
}

/// A commit waiting for its fire time. Owns its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Deferred<T> {
    pub fire_at: Millis,
    pub item: T,
}

/// Pacing state plus the queue of deferred commits.
#[derive(Debug)]
pub struct Throttler<T> {
    config: ThrottleConfig,
    pending: u32,
    last_scheduled_at: Millis,
    // fire_at is non-decreasing, so FIFO order is fire order
    queue: VecDeque<Deferred<T>>,
}

impl<T> Throttler<T> {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            pending: 0,
            last_scheduled_at: 0,
            queue: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Events accepted but not yet committed.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Fire time of the next deferred commit.
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.front().map(|d| d.fire_at)
    }

    /// Accept an item and schedule its commit. Returns the wait in ms from `now`.
    pub fn accept(&mut self, item: T, now: Millis) -> Millis {
        self.pending = self.pending.saturating_add(1);
        let delay = self.config.delay_for(self.pending).as_millis() as i64;

        let since_last = now as i64 - self.last_scheduled_at as i64;
        let wait = (delay - since_last).max(0) as Millis;
        let fire_at = now + wait;
        self.last_scheduled_at = fire_at;

        trace!(pending = self.pending, delay, wait, fire_at, "commit scheduled");
        self.queue.push_back(Deferred { fire_at, item });
        wait
    }

    /// Pop every commit due at `now`, in fire order.
    pub fn take_due(&mut self, now: Millis) -> Vec<Deferred<T>> {
        let mut due = Vec::new();
        while self.queue.front().is_some_and(|d| d.fire_at <= now) {
            if let Some(d) = self.queue.pop_front() {
                self.pending = self.pending.saturating_sub(1);
                due.push(d);
            }
        }
        due
    }

    /// Drop all outstanding commits (teardown).
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending = 0;
    }
}
