use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tmc_errors::{ErrorKind, TmcError, TmcResult};
use tokio::sync::Semaphore;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::context::RecoveryContext;
use crate::default_strategies::{
    ClusterAuthStrategy, ClusterConnectivityStrategy, GenericStrategy, MigrationStrategy,
    PlacementStrategy, ResourceConflictStrategy, SyncStrategy,
};
use crate::execution::{RecoveryExecution, RecoveryState};
use crate::strategy::RecoveryStrategy;

#[derive(Debug, Clone)]
pub struct RecoveryManagerConfig {
    pub max_concurrent_recoveries: usize,
    /// Wall-clock ceiling enforced by the monitor loop, independent of each
    /// strategy's own `timeout()`.
    pub recovery_timeout: Duration,
    pub monitor_interval: Duration,
}

impl Default for RecoveryManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_recoveries: 5,
            recovery_timeout: Duration::from_secs(600),
            monitor_interval: Duration::from_secs(5),
        }
    }
}

/// Dispatches errors to the best-matching [`RecoveryStrategy`] and runs
/// executions under a bounded-concurrency worker pool.
pub struct RecoveryManager {
    config: RecoveryManagerConfig,
    direct: DashMap<ErrorKind, Arc<dyn RecoveryStrategy>>,
    scan_list: RwLock<Vec<Arc<dyn RecoveryStrategy>>>,
    semaphore: Arc<Semaphore>,
    executions: Arc<DashMap<String, RecoveryExecution>>,
    cancel_tokens: Arc<DashMap<String, CancellationToken>>,
}

impl RecoveryManager {
    pub fn new(config: RecoveryManagerConfig) -> Self {
        let permits = config.max_concurrent_recoveries;
        Self {
            config,
            direct: DashMap::new(),
            scan_list: RwLock::new(Vec::new()),
            semaphore: Arc::new(Semaphore::new(permits)),
            executions: Arc::new(DashMap::new()),
            cancel_tokens: Arc::new(DashMap::new()),
        }
    }

    /// Populate the registry with the default strategy set.
    pub fn with_default_strategies(self) -> Self {
        self.register(
            Arc::new(ClusterConnectivityStrategy),
            [
                ErrorKind::ClusterUnreachable,
                ErrorKind::ClusterUnavailable,
                ErrorKind::NetworkConnectivity,
            ],
        );
        self.register(Arc::new(ClusterAuthStrategy), [ErrorKind::ClusterAuth]);
        self.register(
            Arc::new(ResourceConflictStrategy),
            [ErrorKind::ResourceConflict, ErrorKind::SyncConflict],
        );
        self.register(
            Arc::new(PlacementStrategy),
            [
                ErrorKind::PlacementConstraint,
                ErrorKind::PlacementCapacity,
                ErrorKind::PlacementPolicy,
            ],
        );
        self.register(
            Arc::new(SyncStrategy),
            [ErrorKind::SyncFailure, ErrorKind::SyncTimeout],
        );
        self.register(
            Arc::new(MigrationStrategy),
            [ErrorKind::MigrationFailure, ErrorKind::MigrationTimeout],
        );
        self.register_fallback(Arc::new(GenericStrategy));
        self
    }

    /// Register a strategy as the direct handler for each of `kinds`, and
    /// add it to the scan list used when no direct entry matches.
    pub fn register(
        &self,
        strategy: Arc<dyn RecoveryStrategy>,
        kinds: impl IntoIterator<Item = ErrorKind>,
    ) {
        for kind in kinds {
            self.direct.insert(kind, strategy.clone());
        }
        self.push_scan_entry(strategy);
    }

    /// Register a strategy with no direct kind mapping, only reachable via
    /// the scan fallback (this is how `GenericStrategy` is wired in).
    pub fn register_fallback(&self, strategy: Arc<dyn RecoveryStrategy>) {
        self.push_scan_entry(strategy);
    }

    /// Concurrent-recovery permits not currently held.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Configured concurrency cap (`max_concurrent_recoveries`).
    pub fn capacity(&self) -> usize {
        self.config.max_concurrent_recoveries
    }

    fn push_scan_entry(&self, strategy: Arc<dyn RecoveryStrategy>) {
        let mut guard = self.scan_list.write().expect("scan list lock poisoned");
        guard.push(strategy);
        guard.sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    /// Dispatch `error` to the best-matching strategy, enforcing the
    /// concurrency cap. Returns the execution id on successful enqueue.
    pub async fn recover_from_error(
        &self,
        error: TmcError,
        ctx: RecoveryContext,
    ) -> TmcResult<String> {
        let strategy = match self.direct.get(&error.kind()) {
            Some(entry) => entry.clone(),
            None => {
                let guard = self.scan_list.read().expect("scan list lock poisoned");
                guard
                    .iter()
                    .find(|s| s.can_recover(&error))
                    .cloned()
                    .ok_or_else(|| {
                        TmcError::new(
                            ErrorKind::SystemInternal,
                            "recovery",
                            "recover_from_error",
                            format!("no strategy registered for kind {}", error.kind()),
                        )
                    })?
            }
        };

        let permit = self.semaphore.clone().try_acquire_owned().map_err(|_| {
            TmcError::new(
                ErrorKind::SystemInternal,
                "recovery",
                "recover_from_error",
                "max concurrent recoveries reached",
            )
        })?;

        let id = format!("{}-{}", error.kind(), Utc::now().timestamp());
        let execution = RecoveryExecution::new(id.clone(), error.kind(), strategy.name());
        self.executions.insert(id.clone(), execution);

        let token = CancellationToken::new();
        self.cancel_tokens.insert(id.clone(), token.clone());

        let executions = self.executions.clone();
        let cancel_tokens = self.cancel_tokens.clone();
        let strategy_timeout = strategy.timeout();
        let exec_id = id.clone();

        tokio::spawn(async move {
            let _permit = permit;
            if let Some(mut entry) = executions.get_mut(&exec_id) {
                entry.state = RecoveryState::InProgress;
                entry.started_at = Some(Utc::now());
            }

            let outcome = tokio::select! {
                result = tokio::time::timeout(strategy_timeout, strategy.execute(&error, &ctx)) => result,
                _ = token.cancelled() => {
                    if let Some(mut entry) = executions.get_mut(&exec_id) {
                        entry.state = RecoveryState::Cancelled;
                        entry.finished_at = Some(Utc::now());
                    }
                    cancel_tokens.remove(&exec_id);
                    return;
                }
            };

            let mut entry = match executions.get_mut(&exec_id) {
                Some(entry) => entry,
                None => return,
            };
            entry.finished_at = Some(Utc::now());
            match outcome {
                Ok(Ok(())) => entry.state = RecoveryState::Completed,
                Ok(Err(err)) => {
                    entry.state = RecoveryState::Failed;
                    entry.error = Some(err.to_string());
                }
                Err(_) => entry.state = RecoveryState::Timeout,
            }
            drop(entry);
            cancel_tokens.remove(&exec_id);
        });

        Ok(id)
    }

    pub fn execution(&self, id: &str) -> Option<RecoveryExecution> {
        self.executions.get(id).map(|e| e.clone())
    }

    /// Cancel any execution whose wall clock since enqueue exceeds the
    /// configured `recovery_timeout`, independent of the strategy's own
    /// `timeout()`.
    pub async fn run_monitor(&self, token: CancellationToken) {
        let mut ticker = interval(self.config.monitor_interval);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    warn!("recovery monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.cancel_overdue_executions();
                }
            }
        }
    }

    fn cancel_overdue_executions(&self) {
        let now = Utc::now();
        for entry in self.executions.iter() {
            let overdue = matches!(entry.state, RecoveryState::Pending | RecoveryState::InProgress)
                && (now - entry.enqueued_at)
                    .to_std()
                    .map(|elapsed| elapsed > self.config.recovery_timeout)
                    .unwrap_or(false);
            if overdue {
                if let Some((_, token)) = self.cancel_tokens.remove(entry.key()) {
                    info!(execution = %entry.key(), "cancelling overdue recovery execution");
                    token.cancel();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    struct SlowStrategy {
        delay: StdDuration,
    }

    #[async_trait::async_trait]
    impl RecoveryStrategy for SlowStrategy {
        fn name(&self) -> &str {
            "slow"
        }

        fn can_recover(&self, _error: &TmcError) -> bool {
            true
        }

        async fn execute(&self, _error: &TmcError, _ctx: &RecoveryContext) -> TmcResult<()> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        fn timeout(&self) -> StdDuration {
            StdDuration::from_secs(1)
        }
    }

    struct FailingStrategy;

    #[async_trait::async_trait]
    impl RecoveryStrategy for FailingStrategy {
        fn name(&self) -> &str {
            "failing"
        }

        fn can_recover(&self, _error: &TmcError) -> bool {
            true
        }

        async fn execute(&self, error: &TmcError, _ctx: &RecoveryContext) -> TmcResult<()> {
            Err(TmcError::new(
                error.kind(),
                "recovery",
                "execute",
                "deliberately failed",
            ))
        }
    }

    fn unreachable_error() -> TmcError {
        TmcError::new(ErrorKind::ClusterUnreachable, "sync", "apply", "down")
    }

    #[tokio::test]
    async fn direct_lookup_dispatches_to_the_registered_strategy() {
        let manager = RecoveryManager::new(RecoveryManagerConfig::default()).with_default_strategies();
        let id = manager
            .recover_from_error(unreachable_error(), RecoveryContext::new())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let execution = manager.execution(&id).unwrap();
        assert_eq!(execution.strategy, "cluster-connectivity");
        assert_eq!(execution.state, RecoveryState::Completed);
    }

    #[tokio::test]
    async fn no_strategy_registered_fails_fast() {
        let manager = RecoveryManager::new(RecoveryManagerConfig::default());
        let result = manager
            .recover_from_error(unreachable_error(), RecoveryContext::new())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn scan_falls_back_to_generic_for_unmapped_retryable_kinds() {
        let manager = RecoveryManager::new(RecoveryManagerConfig::default()).with_default_strategies();
        let err = TmcError::new(ErrorKind::AggregationFailure, "sync", "apply", "boom");
        let id = manager
            .recover_from_error(err, RecoveryContext::new())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(manager.execution(&id).unwrap().strategy, "generic");
    }

    #[tokio::test]
    async fn concurrency_cap_rejects_excess_dispatches() {
        let config = RecoveryManagerConfig {
            max_concurrent_recoveries: 1,
            ..RecoveryManagerConfig::default()
        };
        let manager = RecoveryManager::new(config);
        manager.register_fallback(Arc::new(SlowStrategy {
            delay: Duration::from_millis(200),
        }));
        let first = manager
            .recover_from_error(unreachable_error(), RecoveryContext::new())
            .await;
        assert!(first.is_ok());
        let second = manager
            .recover_from_error(unreachable_error(), RecoveryContext::new())
            .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn failed_execution_is_recorded_as_failed() {
        let manager = RecoveryManager::new(RecoveryManagerConfig::default());
        manager.register_fallback(Arc::new(FailingStrategy));
        let id = manager
            .recover_from_error(unreachable_error(), RecoveryContext::new())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(manager.execution(&id).unwrap().state, RecoveryState::Failed);
    }
}
