use crate::record::HealthRecord;

/// A component that can report its own health on demand.
#[async_trait::async_trait]
pub trait HealthProvider: Send + Sync {
    fn component_type(&self) -> &str;
    fn component_id(&self) -> &str;
    async fn get_health(&self) -> Option<HealthRecord>;
}
