use std::collections::HashMap;

/// Free-form context passed through to a [`crate::RecoveryStrategy`]'s
/// `execute`, e.g. the workspace/sync-target coordinates that triggered the
/// failure.
#[derive(Debug, Clone, Default)]
pub struct RecoveryContext {
    data: HashMap<String, String>,
}

impl RecoveryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}
