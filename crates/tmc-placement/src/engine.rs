use std::collections::HashMap;

use tmc_errors::{ErrorKind, TmcError, TmcResult};
use tracing::debug;

use crate::affinity;
use crate::filter::{select_survivors, target_count};
use crate::selector::generate_selector_key;
use crate::strategies::{self, RoundRobinCursors};
use crate::types::{ClusterRegistration, PlacementDecision, WorkloadPlacement};

/// Filter -> affinity -> score -> select pipeline over the live cluster
/// inventory. Owns the round-robin cursor state so repeated calls with the
/// same selector key cycle fairly.
pub struct PlacementEngine {
    cursors: RoundRobinCursors,
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self {
            cursors: RoundRobinCursors::new(),
        }
    }

    pub fn place(
        &self,
        placement: Option<&WorkloadPlacement>,
        clusters: &[ClusterRegistration],
    ) -> TmcResult<Vec<PlacementDecision>> {
        let survivors = select_survivors(placement, clusters)?;
        let placement = placement.expect("validated non-nil by select_survivors");

        let mut eligible = Vec::with_capacity(survivors.len());
        let mut affinity_bonus = HashMap::new();
        for cluster in survivors {
            let outcome = affinity::evaluate(&placement.constraints, cluster);
            if outcome.eligible {
                affinity_bonus.insert(cluster.name.clone(), outcome.score_delta);
                eligible.push(cluster);
            }
        }

        if eligible.is_empty() {
            return Err(TmcError::new(
                ErrorKind::PlacementConstraint,
                "placement",
                "place",
                "no eligible clusters",
            ));
        }

        let k = target_count(placement, eligible.len());
        let selector_key = generate_selector_key(Some(&placement.cluster_selector));
        let decisions = strategies::apply(
            placement.policy,
            &selector_key,
            &self.cursors,
            &eligible,
            &affinity_bonus,
            k,
        );

        debug!(
            selector_key = %selector_key,
            decisions = decisions.len(),
            "placement engine produced decisions"
        );
        Ok(decisions)
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClusterSelector, PlacementPolicy, ResourceAxes};

    fn placement(policy: PlacementPolicy) -> WorkloadPlacement {
        WorkloadPlacement::new(policy)
    }

    #[test]
    fn single_cluster_round_robin_matches_the_documented_scenario() {
        let clusters = vec![
            ClusterRegistration::new("cluster-1", "us-west"),
            ClusterRegistration::new("cluster-2", "us-west"),
        ];
        let mut request = placement(PlacementPolicy::RoundRobin);
        request.number_of_clusters = Some(1);
        let engine = PlacementEngine::new();
        let decisions = engine.place(Some(&request), &clusters).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].cluster_name, "cluster-1");
        assert_eq!(decisions[0].score, 100);
        assert_eq!(decisions[0].reason, "Round-robin selection (position 1)");
    }

    #[test]
    fn round_robin_cycles_across_repeated_placements() {
        let clusters = vec![
            ClusterRegistration::new("cluster-a", "us-west"),
            ClusterRegistration::new("cluster-b", "us-west"),
            ClusterRegistration::new("cluster-c", "us-west"),
        ];
        let mut request = placement(PlacementPolicy::RoundRobin);
        request.number_of_clusters = Some(1);
        let engine = PlacementEngine::new();

        let mut sequence = Vec::new();
        for _ in 0..6 {
            let decisions = engine.place(Some(&request), &clusters).unwrap();
            sequence.push(decisions[0].cluster_name.clone());
        }
        assert_eq!(
            sequence,
            vec!["cluster-a", "cluster-b", "cluster-c", "cluster-a", "cluster-b", "cluster-c"]
        );
    }

    #[test]
    fn location_filter_selects_only_the_matching_cluster() {
        let clusters = vec![
            ClusterRegistration::new("cluster-west", "us-west"),
            ClusterRegistration::new("cluster-east", "us-east"),
        ];
        let mut request = placement(PlacementPolicy::RoundRobin);
        request.number_of_clusters = Some(1);
        request.cluster_selector = ClusterSelector {
            location_selector: vec!["us-west".to_string()],
            ..ClusterSelector::default()
        };
        let engine = PlacementEngine::new();
        let decisions = engine.place(Some(&request), &clusters).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].cluster_name, "cluster-west");
    }

    #[test]
    fn capacity_filter_rejects_the_overloaded_cluster() {
        let overloaded = ClusterRegistration::new("overloaded", "us-west")
            .with_capacity(ResourceAxes { cpu: Some(100.0), memory: None, pods: None })
            .with_allocated(ResourceAxes { cpu: Some(95.0), memory: None, pods: None });
        let fine = ClusterRegistration::new("fine", "us-west")
            .with_capacity(ResourceAxes { cpu: Some(100.0), memory: None, pods: None })
            .with_allocated(ResourceAxes { cpu: Some(30.0), memory: None, pods: None });
        let clusters = vec![overloaded, fine];
        let mut request = placement(PlacementPolicy::LeastLoaded);
        request.number_of_clusters = Some(2);
        let engine = PlacementEngine::new();
        let decisions = engine.place(Some(&request), &clusters).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].cluster_name, "fine");
    }

    #[test]
    fn no_eligible_clusters_is_a_placement_constraint_error() {
        let clusters = vec![ClusterRegistration::new("earth-cluster", "earth")];
        let mut request = placement(PlacementPolicy::RoundRobin);
        request.cluster_selector = ClusterSelector {
            location_selector: vec!["mars".to_string()],
            ..ClusterSelector::default()
        };
        let engine = PlacementEngine::new();
        let err = engine.place(Some(&request), &clusters).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlacementConstraint);
    }

    #[test]
    fn nil_placement_fails_validation() {
        let engine = PlacementEngine::new();
        let err = engine.place(None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceValidation);
    }

    #[test]
    fn every_decision_has_a_positive_score_a_name_and_a_reason() {
        let clusters = vec![
            ClusterRegistration::new("cluster-1", "us-west"),
            ClusterRegistration::new("cluster-2", "us-west"),
        ];
        let mut request = placement(PlacementPolicy::RoundRobin);
        request.number_of_clusters = Some(2);
        let engine = PlacementEngine::new();
        let decisions = engine.place(Some(&request), &clusters).unwrap();
        for decision in decisions {
            assert!(!decision.cluster_name.is_empty());
            assert!(decision.score > 0);
            assert!(!decision.reason.is_empty());
        }
    }
}
