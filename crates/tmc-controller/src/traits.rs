use async_trait::async_trait;
use tmc_errors::TmcResult;

use crate::types::{ClusterInfo, EventType};

/// Reports the clusters currently available for placement.
#[async_trait]
pub trait ClusterProvider: Send + Sync {
    async fn get_available_clusters(&self) -> TmcResult<Vec<ClusterInfo>>;
}

/// Records a Normal/Warning event against an object, mirroring the host
/// platform's event recorder capability.
#[async_trait]
pub trait EventRecorder: Send + Sync {
    async fn event(&self, object_key: &str, event_type: EventType, reason: &str, message: &str);
}

/// Performs the per-cluster teardown a deleted placement leaves behind:
/// deleting the workload's projected resources from one previously
/// selected cluster.
#[async_trait]
pub trait PlacementCleanup: Send + Sync {
    async fn cleanup_cluster(&self, placement_key: &str, cluster_name: &str) -> TmcResult<()>;
}
