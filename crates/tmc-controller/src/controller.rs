use std::sync::Arc;

use chrono::Utc;
use tmc_errors::{ErrorKind, TmcError, TmcResult};
use tmc_placement::{
    ClusterRegistration, Condition, ConditionStatus, PlacementDecision, PlacementEngine,
    ResourceAxes, WorkloadPlacement,
};
use tmc_sync::{split_key, DynamicResourceClient, UnstructuredObject};
use tracing::debug;

use crate::traits::{ClusterProvider, EventRecorder, PlacementCleanup};
use crate::types::EventType;

pub const PLACEMENT_GVR: &str = "tmc.io/v1/placements";

#[derive(Debug, Clone)]
pub struct PlacementControllerConfig {
    pub finalizer: String,
    pub heartbeat_staleness: chrono::Duration,
    pub history_cap: usize,
}

impl Default for PlacementControllerConfig {
    fn default() -> Self {
        Self {
            finalizer: "placement.tmc.kcp.io/finalizer".to_string(),
            heartbeat_staleness: chrono::Duration::minutes(5),
            history_cap: 10,
        }
    }
}

/// Reconciles workload-placement objects against the live cluster
/// inventory, using the placement engine to produce decisions and writing
/// them back to the object's status.
pub struct PlacementController {
    config: PlacementControllerConfig,
    placements: Arc<dyn DynamicResourceClient>,
    clusters: Arc<dyn ClusterProvider>,
    events: Arc<dyn EventRecorder>,
    cleanup: Arc<dyn PlacementCleanup>,
    engine: PlacementEngine,
}

impl PlacementController {
    pub fn new(
        config: PlacementControllerConfig, placements: Arc<dyn DynamicResourceClient>,
        clusters: Arc<dyn ClusterProvider>, events: Arc<dyn EventRecorder>,
        cleanup: Arc<dyn PlacementCleanup>,
    ) -> Self {
        Self { config, placements, clusters, events, cleanup, engine: PlacementEngine::new() }
    }

    pub async fn reconcile(&self, key: &str) -> TmcResult<()> {
        let (namespace, name) = split_key(key);
        let Some(mut object) = self.placements.get(PLACEMENT_GVR, namespace, name).await? else {
            return Ok(());
        };

        if object.is_marked_for_deletion() {
            if object.has_finalizer(&self.config.finalizer) {
                self.cleanup_selected_clusters(key, &object).await?;
                object.remove_finalizer(&self.config.finalizer);
                self.placements.update(PLACEMENT_GVR, namespace, object).await?;
            }
            return Ok(());
        }

        if !object.has_finalizer(&self.config.finalizer) {
            object.add_finalizer(&self.config.finalizer);
            object = self.placements.update(PLACEMENT_GVR, namespace, object).await?;
        }

        let placement = self.parse_placement(&object)?;

        match self.place(&placement).await {
            Ok(decisions) => {
                self.write_success_status(namespace, name, &mut object, &decisions).await?;
                self.events
                    .event(key, EventType::Normal, "PlacementSucceeded", &format!(
                        "selected {} cluster(s)",
                        decisions.len()
                    ))
                    .await;
                self.rebalance_check(&placement, &decisions);
                Ok(())
            }
            Err(err) => {
                self.events
                    .event(key, EventType::Warning, "PlacementFailed", &err.to_string())
                    .await;
                Err(err)
            }
        }
    }

    async fn cleanup_selected_clusters(&self, key: &str, object: &UnstructuredObject) -> TmcResult<()> {
        let selected = object
            .field("status")
            .and_then(|status| status.get("selectedClusters"))
            .and_then(|v| v.as_array())
            .map(|list| list.iter().filter_map(|v| v.as_str().map(str::to_string)).collect::<Vec<_>>())
            .unwrap_or_default();

        for cluster in selected {
            self.cleanup.cleanup_cluster(key, &cluster).await?;
        }
        Ok(())
    }

    fn parse_placement(&self, object: &UnstructuredObject) -> TmcResult<WorkloadPlacement> {
        let spec = object.field("spec").ok_or_else(|| {
            TmcError::new(
                ErrorKind::ResourceValidation,
                "placement-controller",
                "parse_placement",
                "placement object carries no spec",
            )
        })?;
        serde_json::from_value(spec.clone()).map_err(|err| {
            TmcError::new(
                ErrorKind::ResourceValidation,
                "placement-controller",
                "parse_placement",
                format!("invalid placement spec: {err}"),
            )
        })
    }

    async fn place(&self, placement: &WorkloadPlacement) -> TmcResult<Vec<PlacementDecision>> {
        let available = self.clusters.get_available_clusters().await?;
        let registrations: Vec<ClusterRegistration> = available
            .into_iter()
            .filter(|cluster| cluster.available)
            .map(|cluster| {
                let mut registration = ClusterRegistration::new(cluster.name, cluster.location);
                registration.labels = cluster.labels;
                registration.workload_count = cluster.workload_count;
                registration.capacity =
                    Some(ResourceAxes { cpu: Some(100.0), memory: Some(100.0), pods: None });
                registration.allocated = Some(ResourceAxes {
                    cpu: Some(cluster.cpu_load * 100.0),
                    memory: Some(cluster.memory_load * 100.0),
                    pods: None,
                });
                registration.conditions.push(Condition {
                    condition_type: "Ready".to_string(),
                    status: ConditionStatus::True,
                    reason: "Available".to_string(),
                    message: "reported available by the cluster provider".to_string(),
                    last_transition_time: Utc::now(),
                });
                registration.last_heartbeat = Some(Utc::now());
                registration
            })
            .collect();

        debug!(policy = ?placement.policy, candidates = registrations.len(), "reconciling placement");
        self.engine.place(Some(placement), &registrations)
    }

    /// Extension point for periodic rebalancing: nothing drains an existing
    /// placement's `selectedClusters` once chosen, even if cluster load
    /// drifts afterward. `rebalanceInterval` is a recognized configuration
    /// option with no trigger wired to it yet; this hook is where that
    /// trigger would call back into `place` for an already-placed workload.
    fn rebalance_check(&self, _placement: &WorkloadPlacement, _decisions: &[PlacementDecision]) {}

    async fn write_success_status(
        &self, namespace: Option<&str>, name: &str, object: &mut UnstructuredObject,
        decisions: &[PlacementDecision],
    ) -> TmcResult<()> {
        let selected_clusters: Vec<String> =
            decisions.iter().map(|d| d.cluster_name.clone()).collect();
        let now = Utc::now();

        let mut history: Vec<serde_json::Value> = object
            .field("status")
            .and_then(|status| status.get("placementHistory"))
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        history.push(serde_json::json!({
            "timestamp": now,
            "selectedClusters": selected_clusters,
        }));
        if history.len() > self.config.history_cap {
            let drop = history.len() - self.config.history_cap;
            history.drain(0..drop);
        }

        object.set_field(
            "status",
            serde_json::json!({
                "selectedClusters": selected_clusters,
                "placementDecisions": decisions,
                "lastPlacementTime": now,
                "placementHistory": history,
            }),
        );
        self.placements.update(PLACEMENT_GVR, namespace, object.deep_copy()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tmc_sync::InMemoryResourceClient;
    use tokio::sync::Mutex;

    struct StubClusters(Vec<crate::types::ClusterInfo>);
    #[async_trait::async_trait]
    impl ClusterProvider for StubClusters {
        async fn get_available_clusters(&self) -> TmcResult<Vec<crate::types::ClusterInfo>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingEvents {
        events: Mutex<Vec<(String, EventType, String)>>,
    }
    #[async_trait::async_trait]
    impl EventRecorder for RecordingEvents {
        async fn event(&self, object_key: &str, event_type: EventType, reason: &str, _message: &str) {
            self.events.lock().await.push((object_key.to_string(), event_type, reason.to_string()));
        }
    }

    struct NoopCleanup;
    #[async_trait::async_trait]
    impl PlacementCleanup for NoopCleanup {
        async fn cleanup_cluster(&self, _placement_key: &str, _cluster_name: &str) -> TmcResult<()> {
            Ok(())
        }
    }

    fn placement_object() -> UnstructuredObject {
        UnstructuredObject::new(json!({
            "metadata": {"name": "my-placement", "namespace": "default"},
            "spec": {
                "clusterSelector": {},
                "numberOfClusters": 1,
                "policy": "RoundRobin",
                "constraints": {}
            }
        }))
    }

    #[tokio::test]
    async fn reconcile_selects_a_cluster_and_writes_status() {
        let placements = Arc::new(InMemoryResourceClient::new());
        placements
            .seed(PLACEMENT_GVR, Some("default"), "my-placement", placement_object())
            .await;

        let clusters = Arc::new(StubClusters(vec![crate::types::ClusterInfo {
            name: "cluster-a".to_string(),
            location: "us-west".to_string(),
            labels: Default::default(),
            workload_count: 0,
            cpu_load: 0.1,
            memory_load: 0.1,
            available: true,
        }]));
        let events = Arc::new(RecordingEvents::default());
        let controller = PlacementController::new(
            PlacementControllerConfig::default(),
            placements.clone(),
            clusters,
            events.clone(),
            Arc::new(NoopCleanup),
        );

        controller.reconcile("default/my-placement").await.unwrap();

        let updated = placements
            .get(PLACEMENT_GVR, Some("default"), "my-placement")
            .await
            .unwrap()
            .unwrap();
        assert!(updated.has_finalizer("placement.tmc.kcp.io/finalizer"));
        let selected = updated.field("status").unwrap().get("selectedClusters").unwrap();
        assert_eq!(selected, &json!(["cluster-a"]));

        let recorded = events.events.lock().await;
        assert_eq!(recorded.last().unwrap().2, "PlacementSucceeded");
    }

    #[tokio::test]
    async fn reconcile_is_a_no_op_for_a_missing_placement() {
        let placements = Arc::new(InMemoryResourceClient::new());
        let clusters = Arc::new(StubClusters(vec![]));
        let events = Arc::new(RecordingEvents::default());
        let controller = PlacementController::new(
            PlacementControllerConfig::default(),
            placements,
            clusters,
            events,
            Arc::new(NoopCleanup),
        );
        controller.reconcile("default/missing").await.unwrap();
    }

    #[tokio::test]
    async fn reconcile_cleans_up_and_removes_the_finalizer_on_deletion() {
        let placements = Arc::new(InMemoryResourceClient::new());
        let mut deleted = placement_object();
        deleted.add_finalizer("placement.tmc.kcp.io/finalizer");
        deleted.set_field(
            "metadata",
            json!({
                "name": "my-placement",
                "namespace": "default",
                "deletionTimestamp": "2024-01-01T00:00:00Z",
                "finalizers": ["placement.tmc.kcp.io/finalizer"]
            }),
        );
        deleted.set_field("status", json!({"selectedClusters": ["cluster-a"]}));
        placements.seed(PLACEMENT_GVR, Some("default"), "my-placement", deleted).await;

        let controller = PlacementController::new(
            PlacementControllerConfig::default(),
            placements.clone(),
            Arc::new(StubClusters(vec![])),
            Arc::new(RecordingEvents::default()),
            Arc::new(NoopCleanup),
        );
        controller.reconcile("default/my-placement").await.unwrap();

        let after = placements
            .get(PLACEMENT_GVR, Some("default"), "my-placement")
            .await
            .unwrap()
            .unwrap();
        assert!(!after.has_finalizer("placement.tmc.kcp.io/finalizer"));
    }
}
