use std::sync::Arc;

use tmc_health::{HealthProvider, HealthRecord, HealthStatus};
use tmc_recovery::RecoveryManager;
use tmc_resilience::CircuitBreakerRegistry;

/// Reports the recovery manager's own concurrency headroom: degraded once
/// every recovery permit is checked out, since new failures would then have
/// to wait rather than recover immediately.
pub struct RecoveryHealthProvider {
    manager: Arc<RecoveryManager>,
}

impl RecoveryHealthProvider {
    pub fn new(manager: Arc<RecoveryManager>) -> Self {
        Self { manager }
    }
}

#[async_trait::async_trait]
impl HealthProvider for RecoveryHealthProvider {
    fn component_type(&self) -> &str {
        "recovery"
    }

    fn component_id(&self) -> &str {
        "manager"
    }

    async fn get_health(&self) -> Option<HealthRecord> {
        let available = self.manager.available_permits();
        let capacity = self.manager.capacity();
        let mut record = HealthRecord::healthy("recovery", "manager")
            .with_detail("available_permits", available.to_string())
            .with_detail("capacity", capacity.to_string());
        if available == 0 {
            record.status = HealthStatus::Degraded;
            record.message = "recovery concurrency cap reached".to_string();
        }
        Some(record)
    }
}

/// Reports on the shared circuit breaker registry: unhealthy while any
/// breaker is tripped, since calls through it are failing fast.
pub struct CircuitBreakerHealthProvider {
    registry: &'static CircuitBreakerRegistry,
}

impl CircuitBreakerHealthProvider {
    pub fn new(registry: &'static CircuitBreakerRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait::async_trait]
impl HealthProvider for CircuitBreakerHealthProvider {
    fn component_type(&self) -> &str {
        "resilience"
    }

    fn component_id(&self) -> &str {
        "circuit-breakers"
    }

    async fn get_health(&self) -> Option<HealthRecord> {
        let mut record = HealthRecord::healthy("resilience", "circuit-breakers")
            .with_detail("registered", self.registry.len().to_string());
        if self.registry.any_open().await {
            record.status = HealthStatus::Unhealthy;
            record.message = "one or more circuit breakers are open".to_string();
        }
        Some(record)
    }
}
