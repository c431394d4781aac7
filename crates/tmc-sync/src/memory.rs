use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tmc_errors::{ErrorKind, TmcError, TmcResult};
use tokio::sync::Mutex;

use crate::object::UnstructuredObject;
use crate::traits::{DynamicResourceClient, EventSource, ResourceEvent};

fn storage_key(gvr: &str, namespace: Option<&str>, name: &str) -> String {
    format!("{gvr}/{}/{name}", namespace.unwrap_or(""))
}

/// A `DynamicResourceClient` backed by an in-process map, standing in for
/// the host platform's API server in tests and non-Kubernetes deployments.
#[derive(Default)]
pub struct InMemoryResourceClient {
    objects: DashMap<String, UnstructuredObject>,
}

impl InMemoryResourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, gvr: &str, namespace: Option<&str>, name: &str, object: UnstructuredObject) {
        self.objects.insert(storage_key(gvr, namespace, name), object);
    }
}

#[async_trait]
impl DynamicResourceClient for InMemoryResourceClient {
    async fn get(
        &self, gvr: &str, namespace: Option<&str>, name: &str,
    ) -> TmcResult<Option<UnstructuredObject>> {
        Ok(self.objects.get(&storage_key(gvr, namespace, name)).map(|entry| entry.clone()))
    }

    async fn create(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject> {
        let key = storage_key(gvr, namespace, object.value().get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default());
        if self.objects.contains_key(&key) {
            return Err(TmcError::new(
                ErrorKind::ResourceConflict,
                "in-memory-client",
                "create",
                format!("object already exists: {key}"),
            ));
        }
        self.objects.insert(key, object.clone());
        Ok(object)
    }

    async fn update(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject> {
        let name = object.value().get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();
        self.objects.insert(storage_key(gvr, namespace, &name), object.clone());
        Ok(object)
    }

    async fn update_status(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject> {
        self.update(gvr, namespace, object).await
    }

    async fn delete(&self, gvr: &str, namespace: Option<&str>, name: &str) -> TmcResult<()> {
        match self.objects.remove(&storage_key(gvr, namespace, name)) {
            Some(_) => Ok(()),
            None => Err(TmcError::new(
                ErrorKind::ResourceNotFound,
                "in-memory-client",
                "delete",
                format!("no such object: {}", storage_key(gvr, namespace, name)),
            )),
        }
    }
}

/// An `EventSource` driven by a plain in-process queue, for tests and
/// non-Kubernetes deployments where events are synthesized directly.
pub struct InMemoryEventSource {
    events: Mutex<std::collections::VecDeque<ResourceEvent>>,
    notify: tokio::sync::Notify,
    synced: HashMap<String, bool>,
}

impl InMemoryEventSource {
    pub fn new(watched_gvrs: impl IntoIterator<Item = String>) -> Self {
        Self {
            events: Mutex::new(std::collections::VecDeque::new()),
            notify: tokio::sync::Notify::new(),
            synced: watched_gvrs.into_iter().map(|gvr| (gvr, true)).collect(),
        }
    }

    pub async fn push(&self, event: ResourceEvent) {
        self.events.lock().await.push_back(event);
        self.notify.notify_one();
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn wait_for_cache_sync(&self) -> TmcResult<HashMap<String, bool>> {
        Ok(self.synced.clone())
    }

    async fn next_event(&self) -> Option<ResourceEvent> {
        loop {
            if let Some(event) = self.events.lock().await.pop_front() {
                return Some(event);
            }
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(name: &str) -> UnstructuredObject {
        UnstructuredObject::new(json!({"metadata": {"name": name}}))
    }

    #[tokio::test]
    async fn get_after_create_returns_the_stored_object() {
        let client = InMemoryResourceClient::new();
        client.create("v1/widgets", Some("default"), named("a")).await.unwrap();
        let fetched = client.get("v1/widgets", Some("default"), "a").await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn delete_of_a_missing_object_is_a_not_found_error() {
        let client = InMemoryResourceClient::new();
        let err = client.delete("v1/widgets", Some("default"), "missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    }

    #[tokio::test]
    async fn event_source_reports_every_watched_gvr_synced() {
        let source = InMemoryEventSource::new(vec!["v1/widgets".to_string()]);
        let synced = source.wait_for_cache_sync().await.unwrap();
        assert_eq!(synced.get("v1/widgets"), Some(&true));
    }
}
