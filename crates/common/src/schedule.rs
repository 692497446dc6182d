//! Fixed-step retry schedule for dispatch and lock acquisition retries.

use std::time::Duration;

/// A fixed sequence of retry delays with attempt tracking.
///
/// Unlike exponential backoff, every delay is taken from a configured step
/// table; once the steps are exhausted the last step repeats until the
/// caller's attempt ceiling stops the loop.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    steps: Vec<Duration>,
    attempt: u32,
}

impl Default for RetrySchedule {
    /// The order-signal dispatch schedule: 0s, 5s, 15s, 45s, 120s.
    fn default() -> Self {
        Self::new(vec![
            Duration::ZERO,
            Duration::from_secs(5),
            Duration::from_secs(15),
            Duration::from_secs(45),
            Duration::from_secs(120),
        ])
    }
}

impl RetrySchedule {
    /// Create a schedule from explicit steps. An empty table behaves as a
    /// zero-delay schedule.
    pub fn new(steps: Vec<Duration>) -> Self {
        Self { steps, attempt: 0 }
    }

    /// Create a schedule repeating one fixed delay.
    pub fn fixed(delay: Duration) -> Self {
        Self::new(vec![delay])
    }

    /// Return the next delay and advance the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let idx = (self.attempt as usize).min(self.steps.len().saturating_sub(1));
        let delay = self.steps.get(idx).copied().unwrap_or(Duration::ZERO);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Reset the attempt counter (call after a success).
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Current attempt number.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Number of configured steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the step table is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
