use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::{interval, timeout, Instant};
use tracing::{debug, info, warn};

use crate::config::HealthMonitorConfig;
use crate::provider::HealthProvider;
use crate::record::{storage_key, HealthRecord, HealthStatus};

/// Registry of [`HealthProvider`]s plus the records their periodic probes
/// produced. Provider registration and record storage sit behind distinct
/// locks so a reader never blocks the probe cycle.
pub struct HealthMonitor {
    config: HealthMonitorConfig,
    providers: RwLock<Vec<Arc<dyn HealthProvider>>>,
    records: RwLock<HashMap<String, HealthRecord>>,
}

impl HealthMonitor {
    pub fn new(config: HealthMonitorConfig) -> Self {
        Self {
            config,
            providers: RwLock::new(Vec::new()),
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, provider: Arc<dyn HealthProvider>) {
        info!(
            component_type = provider.component_type(),
            component_id = provider.component_id(),
            "registering health provider"
        );
        self.providers.write().await.push(provider);
    }

    /// Unregister a provider and drop its stored record.
    pub async fn unregister(&self, component_type: &str, component_id: &str) {
        self.providers
            .write()
            .await
            .retain(|p| !(p.component_type() == component_type && p.component_id() == component_id));
        self.records
            .write()
            .await
            .remove(&storage_key(component_type, component_id));
    }

    /// Run one probe cycle: snapshot providers, probe each under
    /// `health_timeout`, post-classify, and store.
    pub async fn run_cycle(&self) {
        let snapshot: Vec<Arc<dyn HealthProvider>> = self.providers.read().await.clone();

        for provider in snapshot {
            let started = Instant::now();
            let outcome = timeout(self.config.health_timeout, provider.get_health()).await;
            let elapsed = started.elapsed();

            let record = match outcome {
                Ok(Some(mut record)) => {
                    record.duration = elapsed;
                    if elapsed > self.config.unhealthy_threshold {
                        record.status = HealthStatus::Unhealthy;
                    } else if elapsed > self.config.degraded_threshold
                        && !matches!(record.status, HealthStatus::Unhealthy | HealthStatus::Degraded)
                    {
                        // Healthy or Unknown both read as less severe than Degraded in the
                        // aggregation priority order, so a slow probe upgrades either one.
                        record.status = HealthStatus::Degraded;
                    }
                    record
                }
                Ok(None) | Err(_) => HealthRecord {
                    component_type: provider.component_type().to_string(),
                    component_id: provider.component_id().to_string(),
                    status: HealthStatus::Unhealthy,
                    message: "health check returned no record or timed out".to_string(),
                    details: HashMap::new(),
                    timestamp: chrono::Utc::now(),
                    duration: elapsed,
                    error: Some("probe failure".to_string()),
                },
            };

            debug!(key = %record.key(), status = ?record.status, "stored health record");
            self.records.write().await.insert(record.key(), record);
        }
    }

    /// Spin forever, probing every `check_interval` until `token` is cancelled.
    pub async fn run(&self, token: tokio_util::sync::CancellationToken) {
        let mut ticker = interval(self.config.check_interval);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    warn!("health monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    pub async fn records(&self) -> HashMap<String, HealthRecord> {
        self.records.read().await.clone()
    }

    /// Overall health: Unhealthy if any Unhealthy, else Degraded if any
    /// Degraded, else Unknown if any Unknown, else Healthy.
    pub async fn aggregate_status(&self) -> HealthStatus {
        aggregate(self.records.read().await.values())
    }

    /// Aggregation restricted to records whose detail map names `cluster`.
    pub async fn aggregate_status_for_cluster(&self, cluster: &str) -> HealthStatus {
        let records = self.records.read().await;
        aggregate(
            records
                .values()
                .filter(|r| r.details.values().any(|v| v == cluster)),
        )
    }
}

fn aggregate<'a>(records: impl Iterator<Item = &'a HealthRecord>) -> HealthStatus {
    let mut any_unhealthy = false;
    let mut any_degraded = false;
    let mut any_unknown = false;
    let mut saw_any = false;

    for record in records {
        saw_any = true;
        match record.status {
            HealthStatus::Unhealthy => any_unhealthy = true,
            HealthStatus::Degraded => any_degraded = true,
            HealthStatus::Unknown => any_unknown = true,
            HealthStatus::Healthy => {}
        }
    }

    if !saw_any {
        return HealthStatus::Unknown;
    }
    if any_unhealthy {
        HealthStatus::Unhealthy
    } else if any_degraded {
        HealthStatus::Degraded
    } else if any_unknown {
        HealthStatus::Unknown
    } else {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct FakeProvider {
        component_type: &'static str,
        component_id: &'static str,
        record: Option<HealthRecord>,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl HealthProvider for FakeProvider {
        fn component_type(&self) -> &str {
            self.component_type
        }

        fn component_id(&self) -> &str {
            self.component_id
        }

        async fn get_health(&self) -> Option<HealthRecord> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.record.clone()
        }
    }

    #[tokio::test]
    async fn nil_record_is_classified_unhealthy() {
        let monitor = HealthMonitor::new(HealthMonitorConfig::default());
        monitor
            .register(Arc::new(FakeProvider {
                component_type: "cluster",
                component_id: "a",
                record: None,
                delay: Duration::ZERO,
            }))
            .await;
        monitor.run_cycle().await;
        let records = monitor.records().await;
        assert_eq!(records["cluster:a"].status, HealthStatus::Unhealthy);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_downgrades_healthy_to_degraded() {
        let mut config = HealthMonitorConfig::default();
        config.health_timeout = Duration::from_secs(60);
        config.degraded_threshold = Duration::from_secs(1);
        config.unhealthy_threshold = Duration::from_secs(30);
        let monitor = HealthMonitor::new(config);
        monitor
            .register(Arc::new(FakeProvider {
                component_type: "cluster",
                component_id: "a",
                record: Some(HealthRecord::healthy("cluster", "a")),
                delay: Duration::from_secs(5),
            }))
            .await;
        monitor.run_cycle().await;
        let records = monitor.records().await;
        assert_eq!(records["cluster:a"].status, HealthStatus::Degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_upgrades_unknown_to_degraded() {
        let mut config = HealthMonitorConfig::default();
        config.health_timeout = Duration::from_secs(60);
        config.degraded_threshold = Duration::from_secs(1);
        config.unhealthy_threshold = Duration::from_secs(30);
        let monitor = HealthMonitor::new(config);
        let mut record = HealthRecord::healthy("cluster", "a");
        record.status = HealthStatus::Unknown;
        monitor
            .register(Arc::new(FakeProvider {
                component_type: "cluster",
                component_id: "a",
                record: Some(record),
                delay: Duration::from_secs(5),
            }))
            .await;
        monitor.run_cycle().await;
        let records = monitor.records().await;
        assert_eq!(records["cluster:a"].status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn unregister_removes_the_stored_record() {
        let monitor = HealthMonitor::new(HealthMonitorConfig::default());
        monitor
            .register(Arc::new(FakeProvider {
                component_type: "cluster",
                component_id: "a",
                record: Some(HealthRecord::healthy("cluster", "a")),
                delay: Duration::ZERO,
            }))
            .await;
        monitor.run_cycle().await;
        assert!(monitor.records().await.contains_key("cluster:a"));
        monitor.unregister("cluster", "a").await;
        assert!(!monitor.records().await.contains_key("cluster:a"));
    }

    #[tokio::test]
    async fn aggregate_status_is_worst_of_all_records() {
        let monitor = HealthMonitor::new(HealthMonitorConfig::default());
        monitor
            .register(Arc::new(FakeProvider {
                component_type: "cluster",
                component_id: "a",
                record: Some(HealthRecord::healthy("cluster", "a")),
                delay: Duration::ZERO,
            }))
            .await;
        monitor
            .register(Arc::new(FakeProvider {
                component_type: "cluster",
                component_id: "b",
                record: None,
                delay: Duration::ZERO,
            }))
            .await;
        monitor.run_cycle().await;
        assert_eq!(monitor.aggregate_status().await, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn cluster_scoped_aggregation_filters_by_detail_value() {
        let monitor = HealthMonitor::new(HealthMonitorConfig::default());
        monitor
            .register(Arc::new(FakeProvider {
                component_type: "cluster",
                component_id: "a",
                record: Some(
                    HealthRecord::healthy("cluster", "a").with_detail("cluster", "us-east-1"),
                ),
                delay: Duration::ZERO,
            }))
            .await;
        monitor.run_cycle().await;
        assert_eq!(
            monitor.aggregate_status_for_cluster("us-east-1").await,
            HealthStatus::Healthy
        );
        assert_eq!(
            monitor.aggregate_status_for_cluster("eu-west-1").await,
            HealthStatus::Unknown
        );
    }
}
