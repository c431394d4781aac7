use std::collections::{HashMap, HashSet};

use crate::strategies::least_loaded;
use crate::types::{ClusterRegistration, PlacementDecision};

const REGION_LABEL: &str = "topology.kubernetes.io/region";

fn region_of(cluster: &ClusterRegistration) -> Option<&str> {
    cluster.labels.get(REGION_LABEL).map(String::as_str)
}

/// At most one cluster per region in score order, then fill remaining
/// slots by score regardless of region.
pub fn select(
    survivors: &[&ClusterRegistration],
    affinity_bonus: &HashMap<String, i32>,
    k: usize,
) -> Vec<PlacementDecision> {
    let ranked = least_loaded::scored(survivors, affinity_bonus);

    let mut seen_regions: HashSet<String> = HashSet::new();
    let mut chosen: Vec<(ClusterRegistration, u32)> = Vec::new();
    let mut leftover: Vec<(ClusterRegistration, u32)> = Vec::new();

    for (cluster, score) in ranked {
        if chosen.len() >= k {
            break;
        }
        match region_of(&cluster) {
            Some(region) if seen_regions.contains(region) => leftover.push((cluster, score)),
            Some(region) => {
                seen_regions.insert(region.to_string());
                chosen.push((cluster, score));
            }
            None => chosen.push((cluster, score)),
        }
    }

    for entry in leftover {
        if chosen.len() >= k {
            break;
        }
        chosen.push(entry);
    }

    chosen
        .into_iter()
        .map(|(cluster, score)| PlacementDecision {
            cluster_name: cluster.name,
            location: Some(cluster.location),
            score,
            reason: "Spread strategy: one cluster per region preferred".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_most_one_cluster_per_region_until_slots_must_be_filled() {
        let a = ClusterRegistration::new("a", "us-west").with_label(REGION_LABEL, "us");
        let b = ClusterRegistration::new("b", "us-west").with_label(REGION_LABEL, "us");
        let c = ClusterRegistration::new("c", "eu-west").with_label(REGION_LABEL, "eu");
        let survivors = vec![&a, &b, &c];
        let decisions = select(&survivors, &HashMap::new(), 2);
        let regions: HashSet<&str> = decisions
            .iter()
            .filter_map(|d| {
                if d.cluster_name == "a" || d.cluster_name == "b" {
                    Some("us")
                } else {
                    Some("eu")
                }
            })
            .collect();
        assert_eq!(regions.len(), 2);
    }
}
