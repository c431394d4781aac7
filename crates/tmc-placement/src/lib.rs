//! Filter, score, and select target clusters for a workload placement.

mod affinity;
mod config;
mod engine;
mod filter;
mod selector;
mod strategies;
mod types;
mod utilization;

pub use config::PlacementConfig;
pub use engine::PlacementEngine;
pub use selector::generate_selector_key;
pub use types::{
    upsert_condition, AffinityTerm, ClusterRegistration, ClusterSelector, Condition,
    ConditionStatus, LabelSelector, LabelSelectorOperator, LabelSelectorRequirement,
    PlacementConstraints, PlacementDecision, PlacementPolicy, ResourceAxes, Toleration,
    WorkloadPlacement,
};
pub use utilization::utilization;
