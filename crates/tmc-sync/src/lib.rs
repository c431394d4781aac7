//! Resource syncers and the per-sync-target engine that drives them.

mod config;
mod engine;
mod memory;
mod object;
mod syncer;
mod traits;
mod types;

#[cfg(feature = "kubernetes")]
mod kube_backend;

pub use config::SyncConfig;
pub use engine::{SyncEngine, SyncEngineConfig};
pub use memory::{InMemoryEventSource, InMemoryResourceClient};
pub use object::UnstructuredObject;
pub use syncer::ResourceSyncer;
pub use traits::{split_key, DynamicResourceClient, EventSource, ResourceEvent};
pub use types::{ConflictResolution, SyncAction, SyncItem, SyncStatus};

#[cfg(feature = "kubernetes")]
pub use kube_backend::{KubeEventSource, KubeResourceClient};
