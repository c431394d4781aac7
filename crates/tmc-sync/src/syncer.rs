use std::sync::Arc;

use tmc_errors::{ErrorKind, TmcError, TmcResult};
use tracing::debug;

use crate::object::UnstructuredObject;
use crate::traits::{split_key, DynamicResourceClient};
use crate::types::{ConflictResolution, SyncAction, SyncItem};

/// One instance per `(sync-target, gvr)`. Owns the forward (upstream to
/// downstream) and backward (downstream status to upstream status) sync
/// semantics for that coordinate.
pub struct ResourceSyncer {
    gvr: String,
    syncer_namespace: String,
    upstream: Arc<dyn DynamicResourceClient>,
    downstream: Arc<dyn DynamicResourceClient>,
    conflict_resolution: ConflictResolution,
}

impl ResourceSyncer {
    pub fn new(
        gvr: impl Into<String>, syncer_namespace: impl Into<String>,
        upstream: Arc<dyn DynamicResourceClient>, downstream: Arc<dyn DynamicResourceClient>,
    ) -> Self {
        Self {
            gvr: gvr.into(),
            syncer_namespace: syncer_namespace.into(),
            upstream,
            downstream,
            conflict_resolution: ConflictResolution::default(),
        }
    }

    pub fn with_conflict_resolution(mut self, policy: ConflictResolution) -> Self {
        self.conflict_resolution = policy;
        self
    }

    fn annotation_key(&self, suffix: &str) -> String {
        format!("syncer.{}/{}", self.syncer_namespace, suffix)
    }

    pub async fn process(&self, item: &SyncItem) -> TmcResult<()> {
        match item.action {
            SyncAction::Add | SyncAction::Update => self.sync_forward(item).await,
            SyncAction::Delete => self.sync_delete(item).await,
            SyncAction::Status => self.sync_status_backward(item).await,
        }
    }

    /// Transform an upstream object into its downstream projection:
    /// deep-copy, strip host-plane fields, drop status, clear identity
    /// fields that downstream must own, stamp syncer provenance.
    fn project_downstream(&self, upstream: &UnstructuredObject) -> UnstructuredObject {
        let mut projected = upstream.deep_copy();
        projected.strip_host_plane_annotations();
        projected.drop_status();
        projected.clear_resource_version();
        projected.clear_uid();
        projected.set_annotation(&self.annotation_key("synced-from"), "upstream");
        projected.set_annotation(&self.annotation_key("gvr"), &self.gvr);
        projected
    }

    fn skip_requested(&self, upstream: &UnstructuredObject) -> bool {
        upstream.annotation(&self.annotation_key("skip")) == Some("true")
    }

    async fn sync_forward(&self, item: &SyncItem) -> TmcResult<()> {
        let upstream_obj = item.object.as_ref().ok_or_else(|| {
            TmcError::new(
                ErrorKind::SyncFailure,
                "resource-syncer",
                "sync_forward",
                "add/update sync item carries no object snapshot",
            )
        })?;

        if self.skip_requested(upstream_obj) {
            debug!(gvr = %self.gvr, key = %item.key, "skip annotation set, not syncing");
            return Ok(());
        }

        let projected = self.project_downstream(upstream_obj);
        let (namespace, name) = split_key(&item.key);

        match self.downstream.get(&self.gvr, namespace, name).await? {
            None => {
                self.downstream.create(&self.gvr, namespace, projected).await?;
            }
            Some(existing) => {
                let mut merged = projected;
                if let Some(rv) = existing.resource_version() {
                    merged.set_resource_version(rv);
                }
                if let Some(uid) = existing.uid() {
                    merged.metadata_mut()
                        .as_object_mut()
                        .expect("metadata must be a map")
                        .insert("uid".to_string(), serde_json::Value::String(uid.to_string()));
                }
                if let Some(created) = existing.creation_timestamp() {
                    merged.metadata_mut()
                        .as_object_mut()
                        .expect("metadata must be a map")
                        .insert("creationTimestamp".to_string(), created.clone());
                }
                self.downstream.update(&self.gvr, namespace, merged).await?;
            }
        }
        Ok(())
    }

    async fn sync_delete(&self, item: &SyncItem) -> TmcResult<()> {
        let (namespace, name) = split_key(&item.key);
        match self.downstream.get(&self.gvr, namespace, name).await? {
            None => Ok(()),
            Some(_) => match self.downstream.delete(&self.gvr, namespace, name).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::ResourceNotFound => Ok(()),
                Err(err) => Err(err),
            },
        }
    }

    async fn sync_status_backward(&self, item: &SyncItem) -> TmcResult<()> {
        let (namespace, name) = split_key(&item.key);
        let downstream_obj = self.downstream.get(&self.gvr, namespace, name).await?;
        let Some(downstream_obj) = downstream_obj else {
            return Ok(());
        };
        let Some(downstream_status) = downstream_obj.status().cloned() else {
            return Ok(());
        };

        let Some(mut upstream_obj) = self.upstream.get(&self.gvr, namespace, name).await? else {
            return Ok(());
        };

        let merged = match self.conflict_resolution {
            ConflictResolution::FirstWriterWins => {
                upstream_obj.status().cloned().unwrap_or(downstream_status)
            }
            ConflictResolution::LastWriterWins | ConflictResolution::Manual => downstream_status,
        };
        upstream_obj.set_status(merged);
        self.upstream.update_status(&self.gvr, namespace, upstream_obj).await?;
        Ok(())
    }
}
