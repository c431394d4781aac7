use crate::types::{ClusterRegistration, PlacementConstraints};

/// Outcome of evaluating affinity/anti-affinity/tolerations against one
/// survivor: whether it remains eligible, and the score bonus/penalty to
/// apply if so.
pub struct AffinityOutcome {
    pub eligible: bool,
    pub score_delta: i32,
    pub rejection_reason: Option<String>,
}

/// Clusters in this registry never carry a taint model, so tolerations
/// always pass trivially.
pub fn evaluate(constraints: &PlacementConstraints, cluster: &ClusterRegistration) -> AffinityOutcome {
    for term in &constraints.required_affinity {
        if !term.matches(&cluster.labels) {
            return AffinityOutcome {
                eligible: false,
                score_delta: 0,
                rejection_reason: Some("required affinity constraint not satisfied".to_string()),
            };
        }
    }

    for term in &constraints.required_anti_affinity {
        if term.matches(&cluster.labels) {
            return AffinityOutcome {
                eligible: false,
                score_delta: 0,
                rejection_reason: Some(
                    "required anti-affinity constraint not satisfied".to_string(),
                ),
            };
        }
    }

    let mut score_delta = 0i32;
    for term in &constraints.preferred_affinity {
        if term.label_selector.matches(&cluster.labels) {
            score_delta += term.weight;
        }
    }
    for term in &constraints.preferred_anti_affinity {
        if term.label_selector.matches(&cluster.labels) {
            score_delta -= term.weight;
        }
    }

    AffinityOutcome {
        eligible: true,
        score_delta,
        rejection_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AffinityTerm, LabelSelector};
    use std::collections::HashMap;

    fn cluster_with_label(key: &str, value: &str) -> ClusterRegistration {
        ClusterRegistration::new("a", "us-west").with_label(key, value)
    }

    #[test]
    fn required_affinity_rejects_non_matching_clusters() {
        let constraints = PlacementConstraints {
            required_affinity: vec![LabelSelector {
                match_labels: HashMap::from([("tier".to_string(), "gpu".to_string())]),
                match_expressions: vec![],
            }],
            ..PlacementConstraints::default()
        };
        let cluster = cluster_with_label("tier", "cpu");
        let outcome = evaluate(&constraints, &cluster);
        assert!(!outcome.eligible);
        assert_eq!(
            outcome.rejection_reason.as_deref(),
            Some("required affinity constraint not satisfied")
        );
    }

    #[test]
    fn required_anti_affinity_rejects_matching_clusters() {
        let constraints = PlacementConstraints {
            required_anti_affinity: vec![LabelSelector {
                match_labels: HashMap::from([("tier".to_string(), "gpu".to_string())]),
                match_expressions: vec![],
            }],
            ..PlacementConstraints::default()
        };
        let cluster = cluster_with_label("tier", "gpu");
        assert!(!evaluate(&constraints, &cluster).eligible);
    }

    #[test]
    fn preferred_affinity_adds_a_score_bonus() {
        let constraints = PlacementConstraints {
            preferred_affinity: vec![AffinityTerm {
                label_selector: LabelSelector {
                    match_labels: HashMap::from([("tier".to_string(), "gpu".to_string())]),
                    match_expressions: vec![],
                },
                weight: 20,
            }],
            ..PlacementConstraints::default()
        };
        let cluster = cluster_with_label("tier", "gpu");
        let outcome = evaluate(&constraints, &cluster);
        assert!(outcome.eligible);
        assert_eq!(outcome.score_delta, 20);
    }

    #[test]
    fn preferred_anti_affinity_subtracts_a_score_penalty() {
        let constraints = PlacementConstraints {
            preferred_anti_affinity: vec![AffinityTerm {
                label_selector: LabelSelector {
                    match_labels: HashMap::from([("tier".to_string(), "gpu".to_string())]),
                    match_expressions: vec![],
                },
                weight: 20,
            }],
            ..PlacementConstraints::default()
        };
        let cluster = cluster_with_label("tier", "gpu");
        assert_eq!(evaluate(&constraints, &cluster).score_delta, -20);
    }
}
