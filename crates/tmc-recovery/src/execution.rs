use chrono::{DateTime, Utc};
use tmc_errors::ErrorKind;

/// Lifecycle of a single recovery execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Pending,
    InProgress,
    Completed,
    Failed,
    Timeout,
    Cancelled,
}

/// A single dispatched recovery attempt, keyed by `id` (`"{kind}-{unix}"`).
#[derive(Debug, Clone)]
pub struct RecoveryExecution {
    pub id: String,
    pub kind: ErrorKind,
    pub state: RecoveryState,
    pub strategy: String,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl RecoveryExecution {
    pub fn new(id: impl Into<String>, kind: ErrorKind, strategy: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            state: RecoveryState::Pending,
            strategy: strategy.into(),
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
            error: None,
        }
    }
}
