//! Debounce timer for the key buffer.
//!
//! Instead of a background timer we keep a deadline and let the host's
//! event loop poll it, the same way the loop already polls its tick.

use std::time::{Duration, Instant};

/// Default idle window before a pending chord is dropped.
pub const DEFAULT_CHORD_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct KeyTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Default for KeyTimer {
    fn default() -> Self {
        Self::new(DEFAULT_CHORD_TIMEOUT)
    }
}

impl KeyTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// (Re)start the timer from `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    /// Check if the timer has run out by `now`.
    pub fn has_timed_out(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Fire the timer if it has run out. Returns true exactly once per
    /// expired deadline.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        if self.has_timed_out(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
