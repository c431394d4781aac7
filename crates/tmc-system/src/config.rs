use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The `core: {...}` recognized-options block, carrying its documented
/// defaults. `service_name`/`log_level` are descriptive metadata a host
/// binary's logging/registration setup would read; `max_concurrent_operations`/
/// `operation_timeout`/`worker_pool_size` mirror the per-component
/// concurrency knobs already enforced inside `tmc-recovery`/`tmc-sync` at
/// the whole-system level, for a host that wants one dial instead of three.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    pub service_name: String,
    pub log_level: String,
    pub max_concurrent_operations: usize,
    pub operation_timeout: Duration,
    pub worker_pool_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            service_name: "kcp-tmc".to_string(),
            log_level: "info".to_string(),
            max_concurrent_operations: 10,
            operation_timeout: Duration::from_secs(300),
            worker_pool_size: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_recognized_options() {
        let config = CoreConfig::default();
        assert_eq!(config.service_name, "kcp-tmc");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_concurrent_operations, 10);
        assert_eq!(config.operation_timeout, Duration::from_secs(300));
        assert_eq!(config.worker_pool_size, 5);
    }
}
