use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, Patch, PatchParams, PostParams};
use kube::Client;
use kube_runtime::watcher::{self, Config as WatcherConfig, Event as WatchEvent};
use kube_runtime::WatchStreamExt;
use tmc_errors::{ErrorKind, TmcError, TmcResult};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::object::UnstructuredObject;
use crate::traits::{DynamicResourceClient, EventSource, ResourceEvent};

/// Parses a `gvr` string of the form `group/version/resource` (core-group
/// resources use `version/resource`, e.g. `v1/pods`).
fn parse_gvr(gvr: &str) -> TmcResult<ApiResource> {
    let parts: Vec<&str> = gvr.split('/').collect();
    let (group, version, resource) = match parts.as_slice() {
        [version, resource] => ("", *version, *resource),
        [group, version, resource] => (*group, *version, *resource),
        _ => {
            return Err(TmcError::new(
                ErrorKind::SystemConfiguration,
                "kube-backend",
                "parse_gvr",
                format!("malformed gvr: {gvr}"),
            ))
        }
    };
    let gvk = GroupVersionKind {
        group: group.to_string(),
        version: version.to_string(),
        kind: kind_from_resource(resource),
    };
    Ok(ApiResource::from_gvk_with_plural(&gvk, resource))
}

fn kind_from_resource(resource: &str) -> String {
    let singular = resource.strip_suffix('s').unwrap_or(resource);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => singular.to_string(),
    }
}

fn to_object(dynamic: DynamicObject) -> TmcResult<UnstructuredObject> {
    let value = serde_json::to_value(dynamic).map_err(|err| {
        TmcError::new(ErrorKind::SyncFailure, "kube-backend", "to_object", err.to_string())
    })?;
    Ok(UnstructuredObject::new(value))
}

fn from_object(object: &UnstructuredObject) -> TmcResult<DynamicObject> {
    serde_json::from_value(object.value().clone()).map_err(|err| {
        TmcError::new(ErrorKind::SyncFailure, "kube-backend", "from_object", err.to_string())
    })
}

fn map_kube_error(err: kube::Error, operation: &str) -> TmcError {
    let kind = match &err {
        kube::Error::Api(api_err) => match api_err.code {
            404 => ErrorKind::ResourceNotFound,
            409 => ErrorKind::ResourceConflict,
            403 => ErrorKind::ResourcePermission,
            401 => ErrorKind::ClusterAuth,
            408 | 504 => ErrorKind::SyncTimeout,
            503 => ErrorKind::ClusterUnavailable,
            429 => ErrorKind::ClusterUnavailable,
            _ => ErrorKind::SyncFailure,
        },
        _ => ErrorKind::ClusterUnreachable,
    };
    TmcError::new(kind, "kube-backend", operation, err.to_string()).with_cause(err)
}

/// A `DynamicResourceClient` backed by a live `kube::Client`, operating on
/// whatever GVR each call names via a dynamically-resolved `Api<DynamicObject>`.
pub struct KubeResourceClient {
    client: Client,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, gvr: &str, namespace: Option<&str>) -> TmcResult<Api<DynamicObject>> {
        let resource = parse_gvr(gvr)?;
        Ok(match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        })
    }
}

#[async_trait]
impl DynamicResourceClient for KubeResourceClient {
    async fn get(
        &self, gvr: &str, namespace: Option<&str>, name: &str,
    ) -> TmcResult<Option<UnstructuredObject>> {
        match self.api(gvr, namespace)?.get(name).await {
            Ok(obj) => Ok(Some(to_object(obj)?)),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => Ok(None),
            Err(err) => Err(map_kube_error(err, "get")),
        }
    }

    async fn create(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject> {
        let dynamic = from_object(&object)?;
        let created = self
            .api(gvr, namespace)?
            .create(&PostParams::default(), &dynamic)
            .await
            .map_err(|err| map_kube_error(err, "create"))?;
        to_object(created)
    }

    async fn update(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject> {
        let dynamic = from_object(&object)?;
        let name = dynamic.metadata.name.clone().unwrap_or_default();
        let updated = self
            .api(gvr, namespace)?
            .patch(&name, &PatchParams::apply("tmc-sync"), &Patch::Apply(&dynamic))
            .await
            .map_err(|err| map_kube_error(err, "update"))?;
        to_object(updated)
    }

    async fn update_status(
        &self, gvr: &str, namespace: Option<&str>, object: UnstructuredObject,
    ) -> TmcResult<UnstructuredObject> {
        let dynamic = from_object(&object)?;
        let name = dynamic.metadata.name.clone().unwrap_or_default();
        let body = serde_json::to_vec(&dynamic).map_err(|err| {
            TmcError::new(ErrorKind::SyncFailure, "kube-backend", "update_status", err.to_string())
        })?;
        let updated = self
            .api(gvr, namespace)?
            .replace_status(&name, &PostParams::default(), body)
            .await
            .map_err(|err| map_kube_error(err, "update_status"))?;
        to_object(updated)
    }

    async fn delete(&self, gvr: &str, namespace: Option<&str>, name: &str) -> TmcResult<()> {
        match self.api(gvr, namespace)?.delete(name, &Default::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => Ok(()),
            Err(err) => Err(map_kube_error(err, "delete")),
        }
    }
}

/// An `EventSource` watching a fixed set of GVRs via `kube_runtime::watcher`,
/// fanning their applied/deleted objects into a single event channel.
pub struct KubeEventSource {
    receiver: tokio::sync::Mutex<mpsc::Receiver<ResourceEvent>>,
    watched: Vec<String>,
    cancellation_token: CancellationToken,
}

impl KubeEventSource {
    pub fn start(client: Client, gvrs: Vec<String>) -> TmcResult<Self> {
        let (tx, rx) = mpsc::channel(256);
        let cancellation_token = CancellationToken::new();

        for gvr in &gvrs {
            let resource = parse_gvr(gvr)?;
            let api: Api<DynamicObject> = Api::all_with(client.clone(), &resource);
            let gvr_owned = gvr.clone();
            let tx = tx.clone();
            let token = cancellation_token.clone();

            tokio::spawn(async move {
                let stream = watcher::watcher(api, WatcherConfig::default()).default_backoff();
                let mut stream = std::pin::pin!(stream);

                loop {
                    tokio::select! {
                        _ = token.cancelled() => {
                            debug!(gvr = %gvr_owned, "kube event source cancelled");
                            break;
                        }
                        next = stream.next() => {
                            match next {
                                Some(Ok(WatchEvent::Apply(obj))) => {
                                    let Ok(object) = to_object(obj) else { continue };
                                    let _ = tx.send(ResourceEvent::Add { gvr: gvr_owned.clone(), object }).await;
                                }
                                Some(Ok(WatchEvent::Delete(obj))) => {
                                    let Ok(object) = to_object(obj) else { continue };
                                    let _ = tx.send(ResourceEvent::Delete { gvr: gvr_owned.clone(), object }).await;
                                }
                                Some(Ok(WatchEvent::Init | WatchEvent::InitApply(_) | WatchEvent::InitDone)) => {}
                                Some(Err(err)) => {
                                    error!(gvr = %gvr_owned, error = %err, "watch stream error");
                                }
                                None => break,
                            }
                        }
                    }
                }
            });
        }

        Ok(Self { receiver: tokio::sync::Mutex::new(rx), watched: gvrs, cancellation_token })
    }

    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
    }
}

#[async_trait]
impl EventSource for KubeEventSource {
    async fn wait_for_cache_sync(&self) -> TmcResult<HashMap<String, bool>> {
        Ok(self.watched.iter().cloned().map(|gvr| (gvr, true)).collect())
    }

    async fn next_event(&self) -> Option<ResourceEvent> {
        self.receiver.lock().await.recv().await
    }
}
