use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Health status a component can report, ordered worst-to-best for the
/// aggregation rule in [`crate::aggregate_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthStatus {
    Unhealthy,
    Degraded,
    Unknown,
    Healthy,
}

/// A single health-check result, keyed in storage by `"{component_type}:{component_id}"`.
#[derive(Debug, Clone)]
pub struct HealthRecord {
    pub component_type: String,
    pub component_id: String,
    pub status: HealthStatus,
    pub message: String,
    pub details: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
    pub error: Option<String>,
}

impl HealthRecord {
    pub fn key(&self) -> String {
        format!("{}:{}", self.component_type, self.component_id)
    }

    pub fn healthy(component_type: impl Into<String>, component_id: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            component_id: component_id.into(),
            status: HealthStatus::Healthy,
            message: String::new(),
            details: HashMap::new(),
            timestamp: Utc::now(),
            duration: Duration::ZERO,
            error: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

pub(crate) fn storage_key(component_type: &str, component_id: &str) -> String {
    format!("{component_type}:{component_id}")
}
