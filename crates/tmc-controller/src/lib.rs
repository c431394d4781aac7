//! The placement reconcile loop and the per-sync-target status heartbeat.

mod controller;
mod status_reporter;
mod traits;
mod types;

pub use controller::{PlacementController, PlacementControllerConfig, PLACEMENT_GVR};
pub use status_reporter::{StatusReporter, StatusReporterConfig};
pub use traits::{ClusterProvider, EventRecorder, PlacementCleanup};
pub use types::{ClusterInfo, EventType};
