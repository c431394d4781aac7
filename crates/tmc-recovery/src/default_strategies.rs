use tmc_errors::{ErrorKind, TmcError, TmcResult};
use tracing::info;

use crate::context::RecoveryContext;
use crate::strategy::RecoveryStrategy;

macro_rules! kind_strategy {
    ($name:ident, $label:expr, $priority:expr, [$($kind:pat),+ $(,)?]) => {
        pub struct $name;

        #[async_trait::async_trait]
        impl RecoveryStrategy for $name {
            fn name(&self) -> &str {
                $label
            }

            fn can_recover(&self, error: &TmcError) -> bool {
                matches!(error.kind(), $($kind)|+)
            }

            async fn execute(&self, error: &TmcError, ctx: &RecoveryContext) -> TmcResult<()> {
                info!(
                    strategy = $label,
                    kind = %error.kind(),
                    cluster = ctx.get("cluster"),
                    "executing recovery strategy"
                );
                Ok(())
            }

            fn priority(&self) -> i32 {
                $priority
            }
        }
    };
}

kind_strategy!(
    ClusterConnectivityStrategy,
    "cluster-connectivity",
    10,
    [
        ErrorKind::ClusterUnreachable,
        ErrorKind::ClusterUnavailable,
        ErrorKind::NetworkConnectivity,
    ]
);

kind_strategy!(
    ClusterAuthStrategy,
    "cluster-auth",
    10,
    [ErrorKind::ClusterAuth]
);

kind_strategy!(
    ResourceConflictStrategy,
    "resource-conflict",
    5,
    [ErrorKind::ResourceConflict, ErrorKind::SyncConflict]
);

kind_strategy!(
    PlacementStrategy,
    "placement",
    5,
    [
        ErrorKind::PlacementConstraint,
        ErrorKind::PlacementCapacity,
        ErrorKind::PlacementPolicy,
    ]
);

kind_strategy!(
    SyncStrategy,
    "sync",
    5,
    [ErrorKind::SyncFailure, ErrorKind::SyncTimeout]
);

kind_strategy!(
    MigrationStrategy,
    "migration",
    5,
    [ErrorKind::MigrationFailure, ErrorKind::MigrationTimeout]
);

/// Fallback claimed by any error whose `retryable` bit is set and that no
/// more specific strategy already handles.
pub struct GenericStrategy;

#[async_trait::async_trait]
impl RecoveryStrategy for GenericStrategy {
    fn name(&self) -> &str {
        "generic"
    }

    fn can_recover(&self, error: &TmcError) -> bool {
        error.retryable()
    }

    async fn execute(&self, error: &TmcError, ctx: &RecoveryContext) -> TmcResult<()> {
        info!(
            strategy = "generic",
            kind = %error.kind(),
            cluster = ctx.get("cluster"),
            "executing fallback recovery"
        );
        Ok(())
    }

    fn priority(&self) -> i32 {
        -100
    }
}
