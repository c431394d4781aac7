use std::collections::HashMap;

use crate::strategies::least_loaded;
use crate::types::{ClusterRegistration, PlacementDecision};

/// Pure top-k by score, no grouping or region awareness.
pub fn select(
    survivors: &[&ClusterRegistration],
    affinity_bonus: &HashMap<String, i32>,
    k: usize,
) -> Vec<PlacementDecision> {
    least_loaded::scored(survivors, affinity_bonus)
        .into_iter()
        .take(k)
        .map(|(cluster, score)| PlacementDecision {
            cluster_name: cluster.name,
            location: Some(cluster.location),
            score,
            reason: "Score strategy: top-k by score".to_string(),
        })
        .collect()
}
