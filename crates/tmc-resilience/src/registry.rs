use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::circuit_breaker::CircuitBreaker;

/// Named circuit breakers, created lazily on first use and shared by every
/// caller that asks for the same name.
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    default_max_failures: u32,
    default_reset_timeout: Duration,
}

impl CircuitBreakerRegistry {
    pub fn new(default_max_failures: u32, default_reset_timeout: Duration) -> Self {
        Self {
            breakers: DashMap::new(),
            default_max_failures,
            default_reset_timeout,
        }
    }

    pub fn get_or_create(&self, name: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::new(
                    name,
                    self.default_max_failures,
                    self.default_reset_timeout,
                ))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// True if any registered breaker is currently tripped.
    pub async fn any_open(&self) -> bool {
        let snapshot: Vec<Arc<CircuitBreaker>> =
            self.breakers.iter().map(|entry| entry.value().clone()).collect();
        for breaker in snapshot {
            if breaker.state().await == crate::circuit_breaker::BreakerState::Open {
                return true;
            }
        }
        false
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}

/// Process-wide registry, mirroring the single shared recovery-manager map
/// used for the analogous per-target registries elsewhere in the core.
pub static GLOBAL_CIRCUIT_BREAKERS: Lazy<CircuitBreakerRegistry> =
    Lazy::new(CircuitBreakerRegistry::default);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_returns_the_same_breaker_for_a_repeated_name() {
        let registry = CircuitBreakerRegistry::default();
        let a = registry.get_or_create("cluster-a");
        let b = registry.get_or_create("cluster-a");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_names_get_distinct_breakers() {
        let registry = CircuitBreakerRegistry::default();
        let a = registry.get_or_create("cluster-a");
        let b = registry.get_or_create("cluster-b");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn any_open_is_false_until_a_breaker_trips() {
        let registry = CircuitBreakerRegistry::new(2, Duration::from_secs(30));
        let breaker = registry.get_or_create("cluster-a");
        assert!(!registry.any_open().await);

        breaker.record_result(false).await;
        breaker.record_result(false).await;
        assert!(registry.any_open().await);
    }
}
