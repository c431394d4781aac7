mod balanced;
mod best_fit;
mod least_loaded;
mod packed;
mod round_robin;
mod score;
mod spread;

pub use round_robin::RoundRobinCursors;

use crate::types::{ClusterRegistration, PlacementDecision, PlacementPolicy};

/// Apply the strategy named by `policy` to `survivors`, returning an
/// ordered decision list of at most `k` entries. `affinity_bonus` carries
/// the per-cluster score delta computed by the affinity pass, keyed by
/// cluster name.
#[allow(clippy::too_many_arguments)]
pub fn apply(
    policy: PlacementPolicy,
    selector_key: &str,
    cursors: &RoundRobinCursors,
    survivors: &[&ClusterRegistration],
    affinity_bonus: &std::collections::HashMap<String, i32>,
    k: usize,
) -> Vec<PlacementDecision> {
    match policy {
        PlacementPolicy::RoundRobin => {
            round_robin::select(cursors, selector_key, survivors, k)
        }
        PlacementPolicy::LeastLoaded => least_loaded::select(survivors, affinity_bonus, k),
        PlacementPolicy::BestFit => best_fit::select(survivors, affinity_bonus, k),
        PlacementPolicy::Balanced => balanced::select(survivors, affinity_bonus, k),
        PlacementPolicy::Spread => spread::select(survivors, affinity_bonus, k),
        PlacementPolicy::Packed => packed::select(survivors, affinity_bonus, k),
        PlacementPolicy::Score => score::select(survivors, affinity_bonus, k),
    }
}

pub(crate) fn clamp_score(raw: i32) -> u32 {
    raw.clamp(1, 100) as u32
}
