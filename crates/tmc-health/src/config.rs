use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the periodic probe cycle. This is the `health: {...}`
/// configuration block from the recognized options list, carrying its
/// documented defaults; a host binary would decode one of these off disk
/// or environment and hand it to [`crate::HealthMonitor::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMonitorConfig {
    pub check_interval: Duration,
    pub health_timeout: Duration,
    pub degraded_threshold: Duration,
    pub unhealthy_threshold: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            health_timeout: Duration::from_secs(10),
            degraded_threshold: Duration::from_secs(120),
            unhealthy_threshold: Duration::from_secs(300),
        }
    }
}

/// Alias matching the recognized-options vocabulary; `HealthMonitorConfig`
/// predates that naming and already carries the exact same four fields.
pub type HealthConfig = HealthMonitorConfig;
