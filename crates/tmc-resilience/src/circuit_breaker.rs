use std::time::Duration;

use tmc_errors::{ErrorKind, TmcError};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

/// Circuit breaker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Guards a single protected call path behind the Closed/Open/HalfOpen
/// transition table: trips to `Open` after `max_failures` consecutive
/// failures, fails fast while open, and allows exactly one probe call once
/// `reset_timeout` has elapsed since the last failure.
pub struct CircuitBreaker {
    name: String,
    max_failures: u32,
    reset_timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, max_failures: u32, reset_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            max_failures,
            reset_timeout,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn state(&self) -> BreakerState {
        self.inner.lock().await.state
    }

    /// Evaluate whether a call through the breaker should proceed. Returns
    /// `Err` with a synthetic `ClusterUnavailable` error when the breaker is
    /// open and the reset timeout has not yet elapsed. Transitions `Open` ->
    /// `HalfOpen` as a side effect once the timeout has elapsed.
    pub async fn before_call(&self) -> Result<(), TmcError> {
        let mut guard = self.inner.lock().await;
        match guard.state {
            BreakerState::Closed => Ok(()),
            BreakerState::HalfOpen => Ok(()),
            BreakerState::Open => {
                let elapsed = guard
                    .last_failure
                    .map(|t| t.elapsed() >= self.reset_timeout)
                    .unwrap_or(true);
                if elapsed {
                    info!(breaker = %self.name, "circuit breaker transitioning to half-open");
                    guard.state = BreakerState::HalfOpen;
                    Ok(())
                } else {
                    Err(TmcError::new(
                        ErrorKind::ClusterUnavailable,
                        "resilience",
                        "before_call",
                        format!("circuit breaker '{}' is open", self.name),
                    ))
                }
            }
        }
    }

    /// Record the outcome of a call that `before_call` allowed through.
    pub async fn record_result(&self, succeeded: bool) {
        let mut guard = self.inner.lock().await;
        if succeeded {
            if guard.state != BreakerState::Closed {
                info!(breaker = %self.name, "circuit breaker closing after successful probe");
            }
            guard.state = BreakerState::Closed;
            guard.failure_count = 0;
            guard.last_failure = None;
            return;
        }

        guard.last_failure = Some(Instant::now());
        match guard.state {
            BreakerState::HalfOpen => {
                warn!(breaker = %self.name, "probe failed, circuit breaker re-opening");
                guard.state = BreakerState::Open;
            }
            BreakerState::Closed => {
                guard.failure_count += 1;
                if guard.failure_count >= self.max_failures {
                    warn!(breaker = %self.name, failures = guard.failure_count, "circuit breaker opening");
                    guard.state = BreakerState::Open;
                }
            }
            BreakerState::Open => {}
        }
    }

    /// Run `f` through the breaker, recording success/failure automatically.
    pub async fn call<F, Fut, T>(&self, f: F) -> Result<T, TmcError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, TmcError>>,
    {
        self.before_call().await?;
        match f().await {
            Ok(value) => {
                self.record_result(true).await;
                Ok(value)
            }
            Err(err) => {
                self.record_result(false).await;
                Err(err)
            }
        }
    }
}
