//! Explicit retry state machine for provider calls.
//!
//! Transitions are pure so the maximum-attempt accounting and the
//! backoff curve are testable without any provider in the loop:
//! Idle → Attempting → Backoff → Attempting → ... → Failed.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    /// About to issue attempt number `attempt` (1-based).
    Attempting { attempt: u32 },
    /// Waiting out `delay` before attempt number `next_attempt`.
    Backoff { next_attempt: u32, delay: Duration },
    /// Retry budget exhausted.
    Failed,
}

#[derive(Debug, Clone, Copy)]
pub struct RetrySchedule {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetrySchedule {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            // A zero budget would mean never calling at all.
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn start(&self) -> RetryState {
        RetryState::Attempting { attempt: 1 }
    }

    /// State after a transient failure on the given attempt. Doubles
    /// the delay each time: base, 2x, 4x, ...
    pub fn after_transient_failure(&self, attempt: u32) -> RetryState {
        if attempt >= self.max_attempts {
            RetryState::Failed
        } else {
            RetryState::Backoff {
                next_attempt: attempt + 1,
                delay: self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1)),
            }
        }
    }
}
