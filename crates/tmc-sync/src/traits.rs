use std::collections::HashMap;

use async_trait::async_trait;
use tmc_errors::TmcResult;

use crate::object::UnstructuredObject;

/// A change upstream or downstream, as delivered by an [`EventSource`].
#[derive(Debug, Clone)]
pub enum ResourceEvent {
    Add { gvr: String, object: UnstructuredObject },
    Update { gvr: String, old: UnstructuredObject, new: UnstructuredObject },
    Delete { gvr: String, object: UnstructuredObject },
}

/// A capability yielding Add/Update/Delete notifications for the GVRs it
/// was configured to watch, plus an initial cache-sync barrier.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn wait_for_cache_sync(&self) -> TmcResult<HashMap<String, bool>>;

    /// Blocks until the next event, or returns `None` once the source has
    /// been shut down and drained.
    async fn next_event(&self) -> Option<ResourceEvent>;
}

/// A typed client over a single `(gvr, namespace?)` coordinate, mirroring
/// the standard Get/Create/Update/UpdateStatus/Delete surface.
#[async_trait]
pub trait DynamicResourceClient: Send + Sync {
    async fn get(
        &self, gvr: &str, namespace: Option<&str>, name: &str,
    ) -> TmcResult<Option<UnstructuredObject>>;

    async fn create(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject>;

    async fn update(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject>;

    async fn update_status(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject>;

    async fn delete(&self, gvr: &str, namespace: Option<&str>, name: &str) -> TmcResult<()>;
}

/// Splits a sync item's `namespace/name` key. A key with no `/` is treated
/// as a cluster-scoped resource with an empty namespace.
pub fn split_key(key: &str) -> (Option<&str>, &str) {
    match key.split_once('/') {
        Some((ns, name)) => (Some(ns), name),
        None => (None, key),
    }
}
