use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ConflictResolution;

/// The `sync: {...}` recognized-options block, carrying its documented
/// defaults. `max_sync_attempts` duplicates `SyncEngineConfig::max_retries`
/// under the recognized-options name; `batch_size` and `sync_backlog_limit`
/// are recognized but unenforced, since batching and queue-depth limits are
/// out of this core's scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    pub enabled: bool,
    pub sync_interval: Duration,
    pub max_sync_attempts: u32,
    pub sync_timeout: Duration,
    pub batch_size: usize,
    pub conflict_resolution: ConflictResolution,
    pub max_sync_workers: usize,
    pub sync_backlog_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sync_interval: Duration::from_secs(15),
            max_sync_attempts: 3,
            sync_timeout: Duration::from_secs(30),
            batch_size: 50,
            conflict_resolution: ConflictResolution::LastWriterWins,
            max_sync_workers: 10,
            sync_backlog_limit: 1000,
        }
    }
}

impl SyncConfig {
    /// Project onto the fields `SyncEngine` actually consumes.
    pub fn to_engine_config(&self) -> crate::engine::SyncEngineConfig {
        crate::engine::SyncEngineConfig {
            worker_count: self.max_sync_workers,
            max_retries: self.max_sync_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_recognized_options() {
        let config = SyncConfig::default();
        assert!(config.enabled);
        assert_eq!(config.sync_interval, Duration::from_secs(15));
        assert_eq!(config.max_sync_attempts, 3);
        assert_eq!(config.sync_timeout, Duration::from_secs(30));
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.conflict_resolution, ConflictResolution::LastWriterWins);
        assert_eq!(config.max_sync_workers, 10);
        assert_eq!(config.sync_backlog_limit, 1000);
    }

    #[test]
    fn to_engine_config_projects_worker_count_and_retry_budget() {
        let config = SyncConfig { max_sync_workers: 7, max_sync_attempts: 4, ..SyncConfig::default() };
        let engine_config = config.to_engine_config();
        assert_eq!(engine_config.worker_count, 7);
        assert_eq!(engine_config.max_retries, 4);
    }
}
