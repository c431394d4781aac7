use std::collections::HashMap;

use crate::strategies::clamp_score;
use crate::types::{ClusterRegistration, PlacementDecision};
use crate::utilization::utilization;

fn piecewise_score(util: f64) -> f64 {
    if util < 0.3 {
        0.8 + util * 0.7
    } else if util < 0.7 {
        1.0 - (util - 0.3) * 0.5
    } else {
        (0.8 - (util - 0.7) * 2.7).max(0.0)
    }
}

pub fn select(
    survivors: &[&ClusterRegistration],
    affinity_bonus: &HashMap<String, i32>,
    k: usize,
) -> Vec<PlacementDecision> {
    let mut scored: Vec<(ClusterRegistration, u32)> = survivors
        .iter()
        .map(|c| {
            let base = (piecewise_score(utilization(c)) * 100.0).round() as i32;
            let bonus = affinity_bonus.get(&c.name).copied().unwrap_or(0);
            ((*c).clone(), clamp_score(base + bonus))
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(k)
        .map(|(cluster, score)| PlacementDecision {
            cluster_name: cluster.name,
            location: Some(cluster.location),
            score,
            reason: "Balanced strategy: piecewise utilization score".to_string(),
        })
        .collect()
}
