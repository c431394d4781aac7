use chrono::{DateTime, Utc};

use crate::object::UnstructuredObject;

/// The four actions a resource syncer knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Add,
    Update,
    Delete,
    Status,
}

/// Unit of work carried by the sync engine's per-sync-target queue.
#[derive(Debug, Clone)]
pub struct SyncItem {
    pub gvr: String,
    pub key: String,
    pub action: SyncAction,
    pub object: Option<UnstructuredObject>,
    pub retries: u32,
    pub timestamp: DateTime<Utc>,
}

impl SyncItem {
    pub fn new(gvr: impl Into<String>, key: impl Into<String>, action: SyncAction) -> Self {
        Self {
            gvr: gvr.into(),
            key: key.into(),
            action,
            object: None,
            retries: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_object(mut self, object: UnstructuredObject) -> Self {
        self.object = Some(object);
        self
    }

    /// The queue identity: events for the same `(gvr, key)` are ordered
    /// relative to each other, but carry no ordering guarantee across keys.
    pub fn queue_key(&self) -> String {
        format!("{}/{}", self.gvr, self.key)
    }
}

/// How conflicting writes to upstream status are resolved during the
/// backward sync path. Externalized as a policy rather than hard-coded,
/// per the merge-rules decision left open at design level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ConflictResolution {
    #[default]
    LastWriterWins,
    FirstWriterWins,
    Manual,
}

/// Per-GVR counters and connectivity bit tracked by a sync engine.
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    pub synced: u64,
    pub pending: u64,
    pub failed: u64,
    pub connected: bool,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SyncStatus {
    pub fn record_success(&mut self) {
        self.synced += 1;
        self.last_sync_time = Some(Utc::now());
        self.last_error = None;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed += 1;
        self.last_error = Some(message.into());
    }

    pub fn record_pending(&mut self) {
        self.pending += 1;
    }
}
