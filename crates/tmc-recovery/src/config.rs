use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::manager::RecoveryManagerConfig;
use tmc_errors::RetryPolicy;

/// The `recovery: {...}` recognized-options block, carrying its documented
/// defaults. Fans out into the three collaborators that actually consume
/// these numbers: [`RecoveryManagerConfig`] for the manager itself,
/// [`RetryPolicy`] for the `default*` backoff fields, and
/// `circuit_breaker_threshold`/`circuit_breaker_timeout` for whoever
/// constructs the resilience crate's breaker registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryConfig {
    pub max_concurrent_recoveries: usize,
    pub recovery_timeout: Duration,
    pub default_max_retries: u32,
    pub default_initial_delay: Duration,
    pub default_max_delay: Duration,
    pub default_backoff_factor: f64,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_timeout: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_concurrent_recoveries: 5,
            recovery_timeout: Duration::from_secs(600),
            default_max_retries: 5,
            default_initial_delay: Duration::from_secs(1),
            default_max_delay: Duration::from_secs(30),
            default_backoff_factor: 2.0,
            circuit_breaker_threshold: 5,
            circuit_breaker_timeout: Duration::from_secs(60),
        }
    }
}

impl RecoveryConfig {
    pub fn to_manager_config(&self) -> RecoveryManagerConfig {
        RecoveryManagerConfig {
            max_concurrent_recoveries: self.max_concurrent_recoveries,
            recovery_timeout: self.recovery_timeout,
            ..RecoveryManagerConfig::default()
        }
    }

    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.default_max_retries,
            self.default_initial_delay,
            self.default_max_delay,
            self.default_backoff_factor,
        )
    }

    /// `(max_failures, reset_timeout)` for a circuit breaker registry.
    pub fn breaker_params(&self) -> (u32, Duration) {
        (self.circuit_breaker_threshold, self.circuit_breaker_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_recognized_options() {
        let config = RecoveryConfig::default();
        assert_eq!(config.max_concurrent_recoveries, 5);
        assert_eq!(config.recovery_timeout, Duration::from_secs(600));
        assert_eq!(config.default_max_retries, 5);
        assert_eq!(config.default_initial_delay, Duration::from_secs(1));
        assert_eq!(config.default_max_delay, Duration::from_secs(30));
        assert_eq!(config.default_backoff_factor, 2.0);
        assert_eq!(config.circuit_breaker_threshold, 5);
        assert_eq!(config.circuit_breaker_timeout, Duration::from_secs(60));
    }

    #[test]
    fn to_manager_config_carries_the_concurrency_and_timeout_fields() {
        let config = RecoveryConfig { max_concurrent_recoveries: 2, ..RecoveryConfig::default() };
        let manager_config = config.to_manager_config();
        assert_eq!(manager_config.max_concurrent_recoveries, 2);
        assert_eq!(manager_config.recovery_timeout, config.recovery_timeout);
    }

    #[test]
    fn breaker_params_round_trips_threshold_and_timeout() {
        let config = RecoveryConfig::default();
        assert_eq!(config.breaker_params(), (5, Duration::from_secs(60)));
    }
}
