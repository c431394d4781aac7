use std::collections::HashMap;

use crate::strategies::clamp_score;
use crate::types::{ClusterRegistration, PlacementDecision};
use crate::utilization::utilization;

pub(crate) fn scored(
    survivors: &[&ClusterRegistration],
    affinity_bonus: &HashMap<String, i32>,
) -> Vec<(ClusterRegistration, u32)> {
    let mut scored: Vec<(ClusterRegistration, u32)> = survivors
        .iter()
        .map(|c| {
            let base = ((1.0 - utilization(c)) * 100.0).round() as i32;
            let bonus = affinity_bonus.get(&c.name).copied().unwrap_or(0);
            ((*c).clone(), clamp_score(base + bonus))
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}

pub fn select(
    survivors: &[&ClusterRegistration],
    affinity_bonus: &HashMap<String, i32>,
    k: usize,
) -> Vec<PlacementDecision> {
    scored(survivors, affinity_bonus)
        .into_iter()
        .take(k)
        .map(|(cluster, score)| PlacementDecision {
            cluster_name: cluster.name,
            location: Some(cluster.location),
            score,
            reason: "LeastLoaded strategy: lowest utilization selected".to_string(),
        })
        .collect()
}
