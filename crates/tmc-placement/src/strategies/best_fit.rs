use std::collections::HashMap;

use crate::strategies::least_loaded;
use crate::types::{ClusterRegistration, PlacementDecision};

/// Falls back to the least-loaded ordering; only the reason text differs.
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
            reason: "BestFit strategy: lowest utilization selected".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceAxes;

    #[test]
    fn reason_is_prefixed_with_best_fit_strategy() {
        let idle = ClusterRegistration::new("idle", "us-west")
            .with_capacity(ResourceAxes { cpu: Some(100.0), memory: None, pods: None })
            .with_allocated(ResourceAxes { cpu: Some(10.0), memory: None, pods: None });
        let survivors = vec![&idle];
        let decisions = select(&survivors, &HashMap::new(), 1);
        assert!(decisions[0].reason.starts_with("BestFit strategy"));
    }
}
