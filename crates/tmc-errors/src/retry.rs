use std::collections::HashSet;
use std::time::Duration;

use crate::error::TmcError;
use crate::kind::ErrorKind;

/// Backoff and eligibility rules applied before an operation is retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    retryable_kinds: HashSet<ErrorKind>,
}

impl RetryPolicy {
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_factor: f64,
    ) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            backoff_factor,
            retryable_kinds: HashSet::new(),
        }
    }

    /// Restrict retry eligibility to an explicit allow-list of kinds, in
    /// addition to each kind's own `retryable` bit.
    pub fn with_retryable_kinds(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable_kinds = kinds.into_iter().collect();
        self
    }

    /// `min(initial * factor^attempt, max)`. `attempt` is zero-based: the
    /// delay before the first retry is `delay_for(0)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Three-way AND: the attempt budget isn't exhausted, the error is marked
    /// retryable, and (if an allow-list was configured) the kind is in it.
    pub fn should_retry(&self, attempt: u32, error: &TmcError) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        if !error.retryable() {
            return false;
        }
        if !self.retryable_kinds.is_empty() && !self.retryable_kinds.contains(&error.kind()) {
            return false;
        }
        true
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1), Duration::from_secs(30), 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_for_grows_exponentially_and_saturates_at_max() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(30), 2.0);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(10), Duration::from_secs(30));
    }

    #[test]
    fn should_retry_stops_once_the_attempt_budget_is_exhausted() {
        let policy = RetryPolicy::default();
        let err = TmcError::new(ErrorKind::ClusterUnreachable, "sync", "apply", "down");
        assert!(policy.should_retry(0, &err));
        assert!(!policy.should_retry(5, &err));
    }

    #[test]
    fn should_retry_rejects_non_retryable_kinds() {
        let policy = RetryPolicy::default();
        let err = TmcError::new(ErrorKind::ClusterAuth, "sync", "apply", "denied");
        assert!(!policy.should_retry(0, &err));
    }

    #[test]
    fn should_retry_honours_an_explicit_allow_list() {
        let policy = RetryPolicy::default().with_retryable_kinds([ErrorKind::SyncTimeout]);
        let unreachable = TmcError::new(ErrorKind::ClusterUnreachable, "sync", "apply", "down");
        let timeout = TmcError::new(ErrorKind::SyncTimeout, "sync", "apply", "slow");
        assert!(!policy.should_retry(0, &unreachable));
        assert!(policy.should_retry(0, &timeout));
    }
}
