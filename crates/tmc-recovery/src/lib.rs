//! Error-kind recovery strategy registry and bounded-concurrency dispatcher.

mod config;
mod context;
mod default_strategies;
mod execution;
mod manager;
mod strategy;

pub use config::RecoveryConfig;
pub use context::RecoveryContext;
pub use default_strategies::{
    ClusterAuthStrategy, ClusterConnectivityStrategy, GenericStrategy, MigrationStrategy,
    PlacementStrategy, ResourceConflictStrategy, SyncStrategy,
};
pub use execution::{RecoveryExecution, RecoveryState};
pub use manager::{RecoveryManager, RecoveryManagerConfig};
pub use strategy::RecoveryStrategy;
