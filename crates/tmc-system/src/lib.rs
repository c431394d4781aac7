//! The construction root: a small value that owns every registry the core
//! would otherwise reach for through a process-wide singleton.

mod config;
mod health_providers;

use std::sync::Arc;

use tmc_health::{HealthMonitor, HealthMonitorConfig};
use tmc_placement::PlacementEngine;
use tmc_recovery::{RecoveryConfig, RecoveryManager};
use tmc_resilience::GLOBAL_CIRCUIT_BREAKERS;

pub use config::CoreConfig;
use health_providers::{CircuitBreakerHealthProvider, RecoveryHealthProvider};

/// Owns the health-provider registry, the recovery-strategy registry, and
/// a placement engine instance. Constructing a `System` is the one place
/// in the binary that wires these together; everything downstream takes
/// `Arc` handles to its fields rather than reaching for statics.
pub struct System {
    pub health_monitor: Arc<HealthMonitor>,
    pub recovery_manager: Arc<RecoveryManager>,
    pub placement_engine: Arc<PlacementEngine>,
}

#[derive(Debug, Clone, Default)]
pub struct SystemConfig {
    pub core: CoreConfig,
    pub health: HealthMonitorConfig,
    pub recovery: RecoveryConfig,
}

impl System {
    /// Builds the registries and wires in the default recovery strategies
    /// and health providers the core is meant to ship with out of the box.
    pub async fn new(config: SystemConfig) -> Self {
        let health_monitor = Arc::new(HealthMonitor::new(config.health));
        let recovery_manager = Arc::new(
            RecoveryManager::new(config.recovery.to_manager_config()).with_default_strategies(),
        );

        health_monitor
            .register(Arc::new(RecoveryHealthProvider::new(recovery_manager.clone())))
            .await;
        health_monitor
            .register(Arc::new(CircuitBreakerHealthProvider::new(&GLOBAL_CIRCUIT_BREAKERS)))
            .await;

        Self {
            health_monitor,
            recovery_manager,
            placement_engine: Arc::new(PlacementEngine::new()),
        }
    }
}
