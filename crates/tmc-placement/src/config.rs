use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::PlacementPolicy;

/// The `placement: {...}` recognized-options block, carrying its
/// documented defaults. `rebalance_interval` is recognized but has no
/// trigger wired to it yet (see the placement controller's `rebalance_check`
/// hook); a host binary would decode one of these and pass `default_strategy`
/// / `max_clusters_per_placement` / `min_healthy_ratio` into the engine call
/// sites that need them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfig {
    pub enabled: bool,
    pub sync_interval: Duration,
    pub max_concurrent_placements: usize,
    pub default_strategy: PlacementPolicy,
    pub rebalance_interval: Duration,
    pub max_clusters_per_placement: usize,
    pub min_healthy_ratio: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sync_interval: Duration::from_secs(30),
            max_concurrent_placements: 5,
            default_strategy: PlacementPolicy::RoundRobin,
            rebalance_interval: Duration::from_secs(300),
            max_clusters_per_placement: 10,
            min_healthy_ratio: 0.5,
        }
    }
}
