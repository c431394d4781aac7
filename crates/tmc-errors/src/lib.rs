//! Typed error taxonomy and retry policy shared by every crate in the core.

mod error;
mod kind;
mod metrics;
mod retry;

pub use error::{BoxError, TmcError};
pub use kind::{ErrorKind, Severity};
pub use metrics::{MetricsSink, NoopMetricsSink};
pub use retry::RetryPolicy;

/// Convenience alias for fallible operations across the core.
pub type TmcResult<T> = Result<T, TmcError>;
