use serde_json::Value;

const HOST_PLANE_PREFIXES: &[&str] = &["kcp.io/", "experimental.kcp.io/", "internal.kcp.io/"];
const HOST_PLANE_ANNOTATIONS: &[&str] = &["cluster", "experimental.status.cluster"];

/// A runtime-typed downstream/upstream object, represented as the
/// map/list/scalar sum type described for "unstructured" resources, with
/// typed accessors for the handful of paths the syncer actually touches.
#[derive(Debug, Clone, PartialEq)]
pub struct UnstructuredObject {
    value: Value,
}

impl UnstructuredObject {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    pub fn set_field(&mut self, key: &str, value: Value) {
        if let Some(root) = self.value.as_object_mut() {
            root.insert(key.to_string(), value);
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Value {
        self.value
            .as_object_mut()
            .expect("object root must be a map")
            .entry("metadata")
            .or_insert_with(|| Value::Object(Default::default()))
    }

    pub fn annotations(&self) -> Option<&serde_json::Map<String, Value>> {
        self.value
            .get("metadata")?
            .get("annotations")?
            .as_object()
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations()?.get(key)?.as_str()
    }

    pub fn set_annotation(&mut self, key: &str, value: &str) {
        let metadata = self.metadata_mut();
        let annotations = metadata
            .as_object_mut()
            .expect("metadata must be a map")
            .entry("annotations")
            .or_insert_with(|| Value::Object(Default::default()));
        annotations
            .as_object_mut()
            .expect("annotations must be a map")
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    pub fn resource_version(&self) -> Option<&str> {
        self.value.get("metadata")?.get("resourceVersion")?.as_str()
    }

    pub fn set_resource_version(&mut self, version: &str) {
        let metadata = self.metadata_mut();
        metadata
            .as_object_mut()
            .expect("metadata must be a map")
            .insert("resourceVersion".to_string(), Value::String(version.to_string()));
    }

    pub fn clear_resource_version(&mut self) {
        if let Some(metadata) = self.value.get_mut("metadata").and_then(Value::as_object_mut) {
            metadata.remove("resourceVersion");
        }
    }

    pub fn clear_uid(&mut self) {
        if let Some(metadata) = self.value.get_mut("metadata").and_then(Value::as_object_mut) {
            metadata.remove("uid");
        }
    }

    pub fn uid(&self) -> Option<&str> {
        self.value.get("metadata")?.get("uid")?.as_str()
    }

    pub fn creation_timestamp(&self) -> Option<&Value> {
        self.value.get("metadata")?.get("creationTimestamp")
    }

    pub fn status(&self) -> Option<&Value> {
        self.value.get("status")
    }

    pub fn drop_status(&mut self) {
        if let Some(root) = self.value.as_object_mut() {
            root.remove("status");
        }
    }

    pub fn set_status(&mut self, status: Value) {
        if let Some(root) = self.value.as_object_mut() {
            root.insert("status".to_string(), status);
        }
    }

    /// Strip host-plane-only annotations (the `kcp.io/`-family prefixes and
    /// the two specific cluster-coordinate annotations).
    pub fn strip_host_plane_annotations(&mut self) {
        let Some(metadata) = self.value.get_mut("metadata").and_then(Value::as_object_mut) else {
            return;
        };
        let Some(annotations) = metadata.get_mut("annotations").and_then(Value::as_object_mut)
        else {
            return;
        };
        annotations.retain(|key, _| {
            !HOST_PLANE_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
                && !HOST_PLANE_ANNOTATIONS.contains(&key.as_str())
        });
    }

    /// Deep-copy, matching the forward-sync contract's "deep-copy the
    /// object" step.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.value
            .get("metadata")
            .and_then(|m| m.get("deletionTimestamp"))
            .is_some()
    }

    pub fn finalizers(&self) -> Vec<String> {
        self.value
            .get("metadata")
            .and_then(|m| m.get("finalizers"))
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }

    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.finalizers().iter().any(|f| f == finalizer)
    }

    pub fn add_finalizer(&mut self, finalizer: &str) {
        let mut finalizers = self.finalizers();
        if !finalizers.iter().any(|f| f == finalizer) {
            finalizers.push(finalizer.to_string());
            self.set_finalizers(finalizers);
        }
    }

    pub fn remove_finalizer(&mut self, finalizer: &str) {
        let finalizers: Vec<String> =
            self.finalizers().into_iter().filter(|f| f != finalizer).collect();
        self.set_finalizers(finalizers);
    }

    fn set_finalizers(&mut self, finalizers: Vec<String>) {
        let metadata = self.metadata_mut();
        metadata
            .as_object_mut()
            .expect("metadata must be a map")
            .insert(
                "finalizers".to_string(),
                Value::Array(finalizers.into_iter().map(Value::String).collect()),
            );
    }
}
