use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tmc_errors::TmcResult;
use tmc_placement::{upsert_condition, Condition, ConditionStatus};
use tmc_sync::{split_key, DynamicResourceClient};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct StatusReporterConfig {
    pub heartbeat_period: Duration,
    pub unhealthy_after_failures: u32,
    pub syncer_identifier: String,
}

impl Default for StatusReporterConfig {
    fn default() -> Self {
        Self {
            heartbeat_period: Duration::from_secs(30),
            unhealthy_after_failures: 3,
            syncer_identifier: "tmc-syncer".to_string(),
        }
    }
}

const SYNC_TARGET_GVR: &str = "tmc.io/v1/synctargets";

/// Per-sync-target heartbeat loop: stamps liveness and condition state on
/// the sync-target object every `heartbeat_period`.
pub struct StatusReporter {
    config: StatusReporterConfig,
    sync_targets: Arc<dyn DynamicResourceClient>,
    heartbeat_count: AtomicU32,
    error_count: AtomicU32,
    consecutive_failures: AtomicU32,
    cancellation_token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusReporter {
    pub fn new(config: StatusReporterConfig, sync_targets: Arc<dyn DynamicResourceClient>) -> Self {
        Self {
            config,
            sync_targets,
            heartbeat_count: AtomicU32::new(0),
            error_count: AtomicU32::new(0),
            consecutive_failures: AtomicU32::new(0),
            cancellation_token: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    pub async fn start(self: &Arc<Self>, sync_target_key: String) {
        let reporter = self.clone();
        let cancel = self.cancellation_token.clone();
        let mut interval = tokio::time::interval(self.config.heartbeat_period);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        reporter.heartbeat(&sync_target_key).await;
                    }
                }
            }
        });
        *self.task.lock().await = Some(handle);
    }

    pub async fn stop(&self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.task.lock().await.take() {
            let _ = handle.await;
        }
    }

    pub fn heartbeat_count(&self) -> u32 {
        self.heartbeat_count.load(Ordering::SeqCst)
    }

    pub fn connection_healthy(&self) -> bool {
        self.consecutive_failures.load(Ordering::SeqCst) < self.config.unhealthy_after_failures
    }

    async fn heartbeat(&self, sync_target_key: &str) {
        match self.run_once(sync_target_key).await {
            Ok(()) => {
                self.heartbeat_count.fetch_add(1, Ordering::SeqCst);
                self.consecutive_failures.store(0, Ordering::SeqCst);
                debug!(sync_target = %sync_target_key, "heartbeat reported");
            }
            Err(err) => {
                self.error_count.fetch_add(1, Ordering::SeqCst);
                let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                error!(sync_target = %sync_target_key, error = %err, failures, "heartbeat failed");
            }
        }
    }

    async fn run_once(&self, sync_target_key: &str) -> TmcResult<()> {
        let (namespace, name) = split_key(sync_target_key);
        let Some(mut object) = self.sync_targets.get(SYNC_TARGET_GVR, namespace, name).await?
        else {
            return Ok(());
        };

        let now = Utc::now();
        let connection_healthy = self.connection_healthy();

        let mut conditions: Vec<Condition> = object
            .field("status")
            .and_then(|status| status.get("conditions"))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        upsert_condition(
            &mut conditions,
            Condition {
                condition_type: "SyncerReady".to_string(),
                status: ConditionStatus::True,
                reason: "Reporting".to_string(),
                message: "syncer is reporting heartbeats".to_string(),
                last_transition_time: now,
            },
        );
        upsert_condition(
            &mut conditions,
            Condition {
                condition_type: "HeartbeatReady".to_string(),
                status: ConditionStatus::True,
                reason: "Reporting".to_string(),
                message: "heartbeat stamped".to_string(),
                last_transition_time: now,
            },
        );
        upsert_condition(
            &mut conditions,
            if connection_healthy {
                Condition {
                    condition_type: "Ready".to_string(),
                    status: ConditionStatus::True,
                    reason: "ConnectionHealthy".to_string(),
                    message: "connection to the sync target is healthy".to_string(),
                    last_transition_time: now,
                }
            } else {
                Condition {
                    condition_type: "Ready".to_string(),
                    status: ConditionStatus::False,
                    reason: "ConnectionUnhealthy".to_string(),
                    message: "connection to the sync target is unhealthy".to_string(),
                    last_transition_time: now,
                }
            },
        );

        object.set_field(
            "status",
            serde_json::json!({
                "lastHeartbeatTime": now,
                "syncerIdentifier": self.config.syncer_identifier,
                "conditions": conditions,
                "heartbeat": {
                    "count": self.heartbeat_count.load(Ordering::SeqCst),
                    "lastHeartbeat": now,
                    "errors": self.error_count.load(Ordering::SeqCst),
                },
            }),
        );

        self.sync_targets.update(SYNC_TARGET_GVR, namespace, object).await?;
        Ok(())
    }
}
