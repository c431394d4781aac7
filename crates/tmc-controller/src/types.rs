use std::collections::HashMap;

/// A candidate cluster as reported by the host platform's cluster
/// provider, already annotated with the provider's own availability call.
#[derive(Debug, Clone)]
pub struct ClusterInfo {
    pub name: String,
    pub location: String,
    pub labels: HashMap<String, String>,
    pub workload_count: u32,
    pub cpu_load: f64,
    pub memory_load: f64,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}
