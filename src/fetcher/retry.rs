//! Per-page retry policy
//!
//! The paging loop drives a small state machine for each page:
//!
//! ```text
//! Attempting(1) --fail--> Attempting(2) --fail--> ... Attempting(max) --fail--> Exhausted
//!       |                       |                           |
//!       +--------ok-------------+-----------ok--------------+----> Succeeded
//! ```
//!
//! How many attempts are allowed and how long to wait between them is
//! supplied by a [`RetryPolicy`], so callers can swap in their own strategy.

use rand::Rng;
use std::time::Duration;

use crate::config::FetchConfig;

/// Retry strategy for a single page
pub trait RetryPolicy: Send + Sync {
    /// Total attempts allowed per page, first try included
    fn max_attempts(&self) -> u32;

    /// Wait before the attempt following failed attempt `attempt` (1-based)
    fn backoff(&self, attempt: u32) -> Duration;
}

/// Constant backoff with optional jitter
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBackoff {
    max_attempts: u32,
    delay: Duration,
    jitter: bool,
}

impl FixedBackoff {
    /// Create a policy with `max_attempts` attempts separated by `delay`
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            jitter: false,
        }
    }

    /// Add uniform random extra delay of up to 100% of the base delay
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Build from the retry fields of a [`FetchConfig`]
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.max_retries, config.retry_backoff).with_jitter(config.retry_jitter)
    }
}

impl RetryPolicy for FixedBackoff {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn backoff(&self, _attempt: u32) -> Duration {
        if self.jitter {
            add_jitter(self.delay)
        } else {
            self.delay
        }
    }
}

/// Retry progress for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to issue attempt `n` (1-based)
    Attempting(u32),
    /// An attempt returned a page
    Succeeded,
    /// Every allowed attempt failed
    Exhausted,
}

impl RetryState {
    /// Initial state
    pub fn start() -> Self {
        Self::Attempting(1)
    }

    /// State after attempt `attempt` failed under a cap of `max_attempts`
    pub fn after_failure(attempt: u32, max_attempts: u32) -> Self {
        if attempt < max_attempts {
            Self::Attempting(attempt + 1)
        } else {
            Self::Exhausted
        }
    }

    /// Whether the machine has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Exhausted)
    }
}

fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
