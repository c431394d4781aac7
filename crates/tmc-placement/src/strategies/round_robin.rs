use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::{ClusterRegistration, PlacementDecision};

/// Per-selector-key cursor equal to the last selected cluster name. The
/// whole read-select-write sequence runs under a single lock per the
/// engine's own serialization contract.
#[derive(Default)]
pub struct RoundRobinCursors {
    cursors: Mutex<HashMap<String, String>>,
}

impl RoundRobinCursors {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn select(
    cursors: &RoundRobinCursors,
    selector_key: &str,
    survivors: &[&ClusterRegistration],
    k: usize,
) -> Vec<PlacementDecision> {
    let mut names: Vec<&str> = survivors.iter().map(|c| c.name.as_str()).collect();
    names.sort_unstable();

    let mut guard = cursors.cursors.lock().expect("round-robin cursor lock poisoned");
    let start = guard
        .get(selector_key)
        .and_then(|cursor| names.iter().position(|n| *n == cursor))
        .map(|idx| (idx + 1) % names.len())
        .unwrap_or(0);

    let mut decisions = Vec::with_capacity(k);
    let mut score = 100i32;
    for offset in 0..names.len() {
        if decisions.len() >= k {
            break;
        }
        let idx = (start + offset) % names.len();
        let name = names[idx];
        let location = survivors
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.location.clone());
        decisions.push(PlacementDecision {
            cluster_name: name.to_string(),
            location,
            score: score.max(1) as u32,
            reason: format!("Round-robin selection (position {})", decisions.len() + 1),
        });
        score -= 10;
    }

    if let Some(last) = decisions.last() {
        guard.insert(selector_key.to_string(), last.cluster_name.clone());
    }

    decisions
}
