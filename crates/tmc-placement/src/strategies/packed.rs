use std::collections::HashMap;

use crate::strategies::least_loaded;
use crate::types::{ClusterRegistration, PlacementDecision};

const REGION_LABEL: &str = "topology.kubernetes.io/region";
const NO_REGION: &str = "";

/// Group survivors by region, pick the region with the highest mean score,
/// then take that region's top-scoring clusters up to `k`.
pub fn select(
    survivors: &[&ClusterRegistration],
    affinity_bonus: &HashMap<String, i32>,
    k: usize,
) -> Vec<PlacementDecision> {
    let ranked = least_loaded::scored(survivors, affinity_bonus);

    let mut by_region: HashMap<String, Vec<(ClusterRegistration, u32)>> = HashMap::new();
    for (cluster, score) in ranked {
        let region = cluster
            .labels
            .get(REGION_LABEL)
            .cloned()
            .unwrap_or_else(|| NO_REGION.to_string());
        by_region.entry(region).or_default().push((cluster, score));
    }

    let best_region = by_region
        .iter()
        .max_by(|a, b| {
            let mean = |entries: &[(ClusterRegistration, u32)]| {
                entries.iter().map(|(_, s)| *s as f64).sum::<f64>() / entries.len() as f64
            };
            mean(&a.1)
                .partial_cmp(&mean(&b.1))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(region, _)| region.clone());

    let Some(region) = best_region else {
        return Vec::new();
    };

    by_region
        .remove(&region)
        .unwrap_or_default()
        .into_iter()
        .take(k)
        .map(|(cluster, score)| PlacementDecision {
            cluster_name: cluster.name,
            location: Some(cluster.location),
            score,
            reason: "Packed strategy: densest region selected".to_string(),
        })
        .collect()
}
