use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::kind::{ErrorKind, Severity};

/// A boxed, thread-safe error used as the `cause` chain link of a [`TmcError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type produced by every fallible operation across the core.
///
/// Carries enough structure (kind, severity, component, coordinates) for the
/// reliability substrate to make retry and circuit-breaking decisions without
/// re-parsing a message string.
#[derive(Debug)]
pub struct TmcError {
    kind: ErrorKind,
    severity: Severity,
    component: String,
    operation: String,
    message: String,
    cause: Option<BoxError>,
    timestamp: DateTime<Utc>,
    context: HashMap<String, String>,
    retryable: bool,
    recovery_hint: Option<String>,
    cluster: Option<String>,
    resource: Option<String>,
}

impl TmcError {
    /// Build a new error, stamping `severity` and `retryable` from the
    /// classification table unless overridden via the builder methods below.
    pub fn new(
        kind: ErrorKind,
        component: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            component: component.into(),
            operation: operation.into(),
            message: message.into(),
            cause: None,
            timestamp: Utc::now(),
            context: HashMap::new(),
            retryable: kind.default_retryable(),
            recovery_hint: None,
            cluster: None,
            resource: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_recovery_hint(mut self, hint: impl Into<String>) -> Self {
        self.recovery_hint = Some(hint.into());
        self
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }

    pub fn retryable(&self) -> bool {
        self.retryable
    }

    pub fn recovery_hint(&self) -> Option<&str> {
        self.recovery_hint.as_deref()
    }

    pub fn cluster(&self) -> Option<&str> {
        self.cluster.as_deref()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// A structured view suitable for a `tracing` field or an API response
    /// body. The `cause` chain is flattened to its `Display` text since it
    /// may not itself be serializable.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind.as_str(),
            "severity": self.severity.to_string(),
            "component": self.component,
            "operation": self.operation,
            "message": self.message,
            "timestamp": self.timestamp.to_rfc3339(),
            "context": self.context,
            "retryable": self.retryable,
            "recovery_hint": self.recovery_hint,
            "cluster": self.cluster,
            "resource": self.resource,
            "cause": self.cause.as_ref().map(|c| c.to_string()),
        })
    }
}

impl fmt::Display for TmcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}.{}: {}",
            self.kind, self.component, self.operation, self.message
        )?;
        if let Some(cluster) = &self.cluster {
            write!(f, " (cluster={cluster})")?;
        }
        if let Some(resource) = &self.resource {
            write!(f, " (resource={resource})")?;
        }
        Ok(())
    }
}

impl std::error::Error for TmcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
