use std::time::Duration;

use tmc_errors::{TmcError, TmcResult};

use crate::context::RecoveryContext;

/// A pluggable remedy for one or more error kinds.
#[async_trait::async_trait]
pub trait RecoveryStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn can_recover(&self, error: &TmcError) -> bool;

    async fn execute(&self, error: &TmcError, ctx: &RecoveryContext) -> TmcResult<()>;

    /// Higher runs first when more than one strategy claims the same kind
    /// during a scan fallback.
    fn priority(&self) -> i32 {
        0
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }
}
