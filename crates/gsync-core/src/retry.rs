//! Retry policy for pending-operation consumers
//!
//! The queue itself imposes no attempt ceiling and never retries; this is
//! the contract its consumers honor: increment attempts on every failure,
//! back off exponentially before re-listing a failed operation, and past
//! the attempt budget stop retrying and surface the entry for manual
//! inspection (dead-letter) instead.
//!
//! Backoff schedule with the defaults: 1s, 2s, 4s, ... capped at 5 min.

use std::time::Duration;

/// Default attempt budget before an operation is dead-lettered
const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Default base delay for the first backoff step
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default upper bound on a single backoff delay
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);

/// Largest exponent applied to the base delay; beyond this the cap rules
const MAX_SHIFT: u32 = 20;

/// Backoff and dead-letter policy for retrying failed operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after which [`RetryPolicy::is_exhausted`] reports true
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Cap applied to every computed delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before retrying an operation that has failed
    /// `attempts` times: `base_delay * 2^(attempts - 1)`, capped at
    /// `max_delay`. Zero attempts means no failure yet, so no delay.
    #[must_use]
    pub fn backoff_delay(&self, attempts: u32) -> Duration {
        if attempts == 0 {
            return Duration::ZERO;
        }
        let shift = (attempts - 1).min(MAX_SHIFT);
        let delay = self.base_delay.saturating_mul(1u32 << shift);
        delay.min(self.max_delay)
    }

    /// True once the attempt budget is spent and the operation should be
    /// dead-lettered rather than retried
    #[must_use]
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::ZERO);
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(5), Duration::from_secs(16));
    }

    #[test]
    fn test_backoff_caps_at_max_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(30), Duration::from_secs(300));
        assert_eq!(policy.backoff_delay(u32::MAX), Duration::from_secs(300));
    }

    #[test]
    fn test_exhaustion_threshold() {
        let policy = RetryPolicy {
            max_attempts: 3,
            ..Default::default()
        };
        assert!(!policy.is_exhausted(2));
        assert!(policy.is_exhausted(3));
        assert!(policy.is_exhausted(4));
    }

    #[test]
    fn test_custom_base_delay() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(250),
            ..Default::default()
        };
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(250));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(1));
    }
}
