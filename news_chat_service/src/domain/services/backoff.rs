use std::time::Duration;

/// Exponential backoff schedule: the delay doubles after each failed attempt,
/// and no more than `max_attempts` attempts are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl BackoffPolicy {
    pub fn start(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            policy: *self,
            attempts: 0,
            next_delay: self.initial_delay,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// What to do after an attempt failed with a transient error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStep {
    /// Wait for the given delay, then try again
    Retry(Duration),
    /// No attempt left
    Exhausted,
}

/// Retry state of one call: how many attempts were made and how long to wait next
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    policy: BackoffPolicy,
    attempts: u32,
    next_delay: Duration,
}

impl ExponentialBackoff {
    /// Records a failed attempt and returns the next step
    pub fn on_transient_failure(&mut self) -> BackoffStep {
        self.attempts += 1;

        if self.attempts >= self.policy.max_attempts {
            return BackoffStep::Exhausted;
        }

        let delay = self.next_delay;
        self.next_delay = self.next_delay.saturating_mul(2);
        BackoffStep::Retry(delay)
    }

    /// Number of failed attempts recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
