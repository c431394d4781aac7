use std::fmt;

/// Severity assigned to a [`super::TmcError`] when no explicit override is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// The closed set of error kinds the core can raise, grouped by the
/// subsystem that classifies them (resource / cluster / placement / sync /
/// migration / aggregation / projection / system).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    ResourceNotFound,
    ResourceConflict,
    ResourceValidation,
    ResourcePermission,

    ClusterUnreachable,
    ClusterUnavailable,
    ClusterAuth,
    ClusterConfig,

    PlacementConstraint,
    PlacementCapacity,
    PlacementPolicy,

    SyncFailure,
    SyncConflict,
    SyncTimeout,

    MigrationFailure,
    MigrationTimeout,
    MigrationRollback,

    AggregationFailure,
    AggregationConflict,
    AggregationTransform,

    ProjectionFailure,
    ProjectionConflict,
    ProjectionTransform,

    SystemInternal,
    SystemConfiguration,
    NetworkConnectivity,
}

impl ErrorKind {
    /// Default `retryable` bit per the classification contract.
    pub fn default_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::ClusterUnreachable
                | ErrorKind::ClusterUnavailable
                | ErrorKind::SyncTimeout
                | ErrorKind::MigrationTimeout
                | ErrorKind::AggregationFailure
                | ErrorKind::ProjectionFailure
                | ErrorKind::NetworkConnectivity
                | ErrorKind::SystemInternal
        )
    }

    /// Default [`Severity`] per the classification contract.
    pub fn default_severity(self) -> Severity {
        match self {
            ErrorKind::ClusterAuth | ErrorKind::MigrationRollback | ErrorKind::SystemInternal => {
                Severity::Critical
            }
            ErrorKind::ClusterUnreachable
            | ErrorKind::ClusterUnavailable
            | ErrorKind::SyncFailure
            | ErrorKind::SyncTimeout
            | ErrorKind::MigrationFailure
            | ErrorKind::MigrationTimeout
            | ErrorKind::AggregationFailure
            | ErrorKind::ProjectionFailure
            | ErrorKind::NetworkConnectivity => Severity::High,
            ErrorKind::ResourceConflict
            | ErrorKind::SyncConflict
            | ErrorKind::AggregationConflict
            | ErrorKind::ProjectionConflict
            | ErrorKind::PlacementCapacity
            | ErrorKind::PlacementConstraint
            | ErrorKind::SystemConfiguration
            | ErrorKind::ClusterConfig => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ResourceNotFound => "ResourceNotFound",
            ErrorKind::ResourceConflict => "ResourceConflict",
            ErrorKind::ResourceValidation => "ResourceValidation",
            ErrorKind::ResourcePermission => "ResourcePermission",
            ErrorKind::ClusterUnreachable => "ClusterUnreachable",
            ErrorKind::ClusterUnavailable => "ClusterUnavailable",
            ErrorKind::ClusterAuth => "ClusterAuth",
            ErrorKind::ClusterConfig => "ClusterConfig",
            ErrorKind::PlacementConstraint => "PlacementConstraint",
            ErrorKind::PlacementCapacity => "PlacementCapacity",
            ErrorKind::PlacementPolicy => "PlacementPolicy",
            ErrorKind::SyncFailure => "SyncFailure",
            ErrorKind::SyncConflict => "SyncConflict",
            ErrorKind::SyncTimeout => "SyncTimeout",
            ErrorKind::MigrationFailure => "MigrationFailure",
            ErrorKind::MigrationTimeout => "MigrationTimeout",
            ErrorKind::MigrationRollback => "MigrationRollback",
            ErrorKind::AggregationFailure => "AggregationFailure",
            ErrorKind::AggregationConflict => "AggregationConflict",
            ErrorKind::AggregationTransform => "AggregationTransform",
            ErrorKind::ProjectionFailure => "ProjectionFailure",
            ErrorKind::ProjectionConflict => "ProjectionConflict",
            ErrorKind::ProjectionTransform => "ProjectionTransform",
            ErrorKind::SystemInternal => "SystemInternal",
            ErrorKind::SystemConfiguration => "SystemConfiguration",
            ErrorKind::NetworkConnectivity => "NetworkConnectivity",
        }
    }

    /// Map a standard API failure category (as sniffed off a host-platform
    /// error) onto a kind. Unknown categories fall back to `SystemInternal`.
    pub fn from_api_category(category: &str) -> Self {
        match category {
            "not-found" => ErrorKind::ResourceNotFound,
            "already-exists" | "conflict" => ErrorKind::ResourceConflict,
            "forbidden" => ErrorKind::ResourcePermission,
            "unauthorized" => ErrorKind::ClusterAuth,
            "timeout" | "server-timeout" => ErrorKind::SyncTimeout,
            "service-unavailable" => ErrorKind::ClusterUnavailable,
            "too-many-requests" => ErrorKind::ClusterUnavailable,
            "internal" => ErrorKind::SystemInternal,
            _ => ErrorKind::SystemInternal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_defaults_match_classification_contract() {
        for k in [
            ErrorKind::ClusterUnreachable,
            ErrorKind::ClusterUnavailable,
            ErrorKind::SyncTimeout,
            ErrorKind::MigrationTimeout,
            ErrorKind::AggregationFailure,
            ErrorKind::ProjectionFailure,
            ErrorKind::NetworkConnectivity,
            ErrorKind::SystemInternal,
        ] {
            assert!(k.default_retryable(), "{k} should default retryable");
        }
        assert!(!ErrorKind::ResourceNotFound.default_retryable());
        assert!(!ErrorKind::ClusterAuth.default_retryable());
    }

    #[test]
    fn critical_defaults_match_classification_contract() {
        assert_eq!(ErrorKind::ClusterAuth.default_severity(), Severity::Critical);
        assert_eq!(
            ErrorKind::MigrationRollback.default_severity(),
            Severity::Critical
        );
        assert_eq!(ErrorKind::SystemInternal.default_severity(), Severity::Critical);
    }

    #[test]
    fn api_category_conversion_covers_the_documented_set() {
        assert_eq!(
            ErrorKind::from_api_category("not-found"),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            ErrorKind::from_api_category("already-exists"),
            ErrorKind::ResourceConflict
        );
        assert_eq!(
            ErrorKind::from_api_category("unauthorized"),
            ErrorKind::ClusterAuth
        );
        assert_eq!(
            ErrorKind::from_api_category("service-unavailable"),
            ErrorKind::ClusterUnavailable
        );
        assert_eq!(
            ErrorKind::from_api_category("bogus"),
            ErrorKind::SystemInternal
        );
    }
}
