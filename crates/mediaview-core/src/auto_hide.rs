//! One-shot overlay auto-hide timer
//!
//! Lives on the UI event loop as a single deadline. Scheduling replaces any
//! pending deadline, so at most one hide is ever outstanding.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct AutoHide {
    delay: Duration,
    deadline: Option<Instant>,
}

impl AutoHide {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending hide and arm a new one `delay` after `now`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return true if the deadline has passed
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
