use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state condition carried on a resource's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub condition_type: String,
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Upsert a condition matched by `condition_type`, replacing it wholesale
/// and preserving list order.
pub fn upsert_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    if let Some(existing) = conditions
        .iter_mut()
        .find(|c| c.condition_type == condition.condition_type)
    {
        *existing = condition;
    } else {
        conditions.push(condition);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceAxes {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub pods: Option<f64>,
}

/// A physical cluster available to receive workloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRegistration {
    pub name: String,
    pub location: String,
    pub labels: HashMap<String, String>,
    pub capacity: Option<ResourceAxes>,
    pub allocated: Option<ResourceAxes>,
    pub conditions: Vec<Condition>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub workload_count: u32,
}

impl ClusterRegistration {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            labels: HashMap::new(),
            capacity: None,
            allocated: None,
            conditions: Vec::new(),
            last_heartbeat: None,
            workload_count: 0,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_capacity(mut self, capacity: ResourceAxes) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_allocated(mut self, allocated: ResourceAxes) -> Self {
        self.allocated = Some(allocated);
        self
    }

    pub fn is_ready(&self, staleness: chrono::Duration) -> bool {
        let ready_condition = self
            .conditions
            .iter()
            .find(|c| c.condition_type == "Ready")
            .map(|c| c.status == ConditionStatus::True)
            .unwrap_or(false);
        let fresh = self
            .last_heartbeat
            .map(|t| Utc::now() - t <= staleness)
            .unwrap_or(false);
        ready_condition && fresh
    }
}

/// An operator over a label's value set, matching standard requirements
/// semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LabelSelectorOperator {
    In(Vec<String>),
    NotIn(Vec<String>),
    Exists,
    DoesNotExist,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: LabelSelectorOperator,
}

/// `match_labels` is ANDed with every entry of `match_expressions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSelector {
    pub match_labels: HashMap<String, String>,
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

impl LabelSelector {
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty() && self.match_expressions.is_empty()
    }

    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        for (key, value) in &self.match_labels {
            if labels.get(key) != Some(value) {
                return false;
            }
        }
        for requirement in &self.match_expressions {
            let present = labels.get(&requirement.key);
            let ok = match &requirement.operator {
                LabelSelectorOperator::In(values) => {
                    present.map(|v| values.contains(v)).unwrap_or(false)
                }
                LabelSelectorOperator::NotIn(values) => {
                    present.map(|v| !values.contains(v)).unwrap_or(true)
                }
                LabelSelectorOperator::Exists => present.is_some(),
                LabelSelectorOperator::DoesNotExist => present.is_none(),
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

/// The engine's pluggable distribution strategy. The request-level
/// vocabulary (`round-robin`, `least-loaded`, `random`, `location-aware`,
/// `affinity`) maps onto this set: `random` and `affinity` fold into
/// `Score` (affinity scoring is a pre-selection step applied regardless of
/// strategy, not a distinct algorithm), and `location-aware` folds into
/// `Spread` (its region-grouping behavior is the closest match).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementPolicy {
    RoundRobin,
    LeastLoaded,
    BestFit,
    Balanced,
    Spread,
    Packed,
    Score,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterSelector {
    pub cluster_names: Vec<String>,
    pub location_selector: Vec<String>,
    pub label_selector: Option<LabelSelector>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Toleration {
    pub key: String,
    pub value: Option<String>,
    pub effect: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffinityTerm {
    pub label_selector: LabelSelector,
    pub weight: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementConstraints {
    pub required_affinity: Vec<LabelSelector>,
    pub preferred_affinity: Vec<AffinityTerm>,
    pub required_anti_affinity: Vec<LabelSelector>,
    pub preferred_anti_affinity: Vec<AffinityTerm>,
    pub tolerations: Vec<Toleration>,
}

/// A workload placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadPlacement {
    pub cluster_selector: ClusterSelector,
    pub number_of_clusters: Option<u32>,
    pub policy: PlacementPolicy,
    pub constraints: PlacementConstraints,
}

impl WorkloadPlacement {
    pub fn new(policy: PlacementPolicy) -> Self {
        Self {
            cluster_selector: ClusterSelector::default(),
            number_of_clusters: None,
            policy,
            constraints: PlacementConstraints::default(),
        }
    }
}

/// An engine output naming one target cluster plus score and reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementDecision {
    pub cluster_name: String,
    pub location: Option<String>,
    pub score: u32,
    pub reason: String,
}
