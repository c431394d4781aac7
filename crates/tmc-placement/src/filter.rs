use tmc_errors::{ErrorKind, TmcError, TmcResult};

use crate::types::{ClusterRegistration, ClusterSelector, PlacementPolicy, WorkloadPlacement};
use crate::utilization::utilization;

const CAPACITY_THRESHOLD: f64 = 0.9;

fn selector_matches(selector: &ClusterSelector, cluster: &ClusterRegistration) -> bool {
    if !selector.cluster_names.is_empty() && !selector.cluster_names.contains(&cluster.name) {
        return false;
    }
    if !selector.location_selector.is_empty()
        && !selector.location_selector.contains(&cluster.location)
    {
        return false;
    }
    if let Some(label_selector) = &selector.label_selector {
        if !label_selector.matches(&cluster.labels) {
            return false;
        }
    }
    true
}

/// A cluster with no capacity or allocation info at all is considered
/// eligible regardless of the 90% threshold.
fn within_capacity(cluster: &ClusterRegistration) -> bool {
    if cluster.capacity.is_none() && cluster.allocated.is_none() {
        return true;
    }
    utilization(cluster) < CAPACITY_THRESHOLD
}

/// Steps 1-4 of the common filter pipeline: validate, selector filter,
/// empty check, and (for resource-aware strategies) the capacity filter.
pub fn select_survivors<'a>(
    placement: Option<&WorkloadPlacement>,
    clusters: &'a [ClusterRegistration],
) -> TmcResult<Vec<&'a ClusterRegistration>> {
    let placement = placement.ok_or_else(|| {
        TmcError::new(
            ErrorKind::ResourceValidation,
            "placement",
            "select_survivors",
            "workload placement cannot be nil",
        )
    })?;

    let mut survivors: Vec<&ClusterRegistration> = clusters
        .iter()
        .filter(|c| selector_matches(&placement.cluster_selector, c))
        .collect();

    if survivors.is_empty() {
        return Err(TmcError::new(
            ErrorKind::PlacementConstraint,
            "placement",
            "select_survivors",
            "no eligible clusters",
        ));
    }

    if placement.policy != PlacementPolicy::RoundRobin {
        survivors.retain(|c| within_capacity(c));
        if survivors.is_empty() {
            return Err(TmcError::new(
                ErrorKind::PlacementConstraint,
                "placement",
                "select_survivors",
                "no eligible clusters",
            ));
        }
    }

    Ok(survivors)
}

/// Step 5: target count, clamped to the survivor count.
pub fn target_count(placement: &WorkloadPlacement, survivor_count: usize) -> usize {
    let k = placement.number_of_clusters.unwrap_or(1) as usize;
    k.min(survivor_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClusterSelector;

    fn cluster(name: &str, location: &str) -> ClusterRegistration {
        ClusterRegistration::new(name, location)
    }

    #[test]
    fn nil_placement_is_a_validation_error() {
        let clusters = vec![cluster("a", "us-west")];
        let err = select_survivors(None, &clusters).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceValidation);
    }

    #[test]
    fn location_selector_filters_out_non_matching_clusters() {
        let clusters = vec![cluster("west", "us-west"), cluster("east", "us-east")];
        let placement = WorkloadPlacement {
            cluster_selector: ClusterSelector {
                location_selector: vec!["us-west".to_string()],
                ..ClusterSelector::default()
            },
            ..WorkloadPlacement::new(PlacementPolicy::RoundRobin)
        };
        let survivors = select_survivors(Some(&placement), &clusters).unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].name, "west");
    }

    #[test]
    fn no_matches_is_a_placement_constraint_error() {
        let clusters = vec![cluster("east", "us-east")];
        let placement = WorkloadPlacement {
            cluster_selector: ClusterSelector {
                location_selector: vec!["mars".to_string()],
                ..ClusterSelector::default()
            },
            ..WorkloadPlacement::new(PlacementPolicy::RoundRobin)
        };
        let err = select_survivors(Some(&placement), &clusters).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlacementConstraint);
    }

    #[test]
    fn target_count_clamps_to_survivor_count() {
        let placement = WorkloadPlacement {
            number_of_clusters: Some(5),
            ..WorkloadPlacement::new(PlacementPolicy::RoundRobin)
        };
        assert_eq!(target_count(&placement, 2), 2);
    }
}
