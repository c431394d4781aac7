use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tmc_errors::{ErrorKind, RetryPolicy, TmcError, TmcResult};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::syncer::ResourceSyncer;
use crate::traits::{EventSource, ResourceEvent};
use crate::types::{SyncAction, SyncItem, SyncStatus};

#[derive(Debug, Clone, Copy)]
pub struct SyncEngineConfig {
    pub worker_count: usize,
    pub max_retries: u32,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self { worker_count: 5, max_retries: 3 }
    }
}

/// FIFO-per-key work queue: at most one in-flight item per `(gvr, key)`,
/// no ordering guarantee across distinct keys, rate-limited re-add on
/// retry.
struct WorkQueue {
    items: Mutex<VecDeque<SyncItem>>,
    in_flight: Mutex<HashSet<String>>,
    notify: Notify,
    shutdown: AtomicBool,
}

impl WorkQueue {
    fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            in_flight: Mutex::new(HashSet::new()),
            notify: Notify::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    async fn push(&self, item: SyncItem) {
        self.items.lock().await.push_back(item);
        self.notify.notify_one();
    }

    async fn push_after(self: &Arc<Self>, item: SyncItem, delay: std::time::Duration) {
        let queue = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.push(item).await;
        });
    }

    /// Waits for an item whose key is not already being processed. Returns
    /// `None` once shut down and no such item remains.
    async fn pop(&self, cancel: &CancellationToken) -> Option<SyncItem> {
        loop {
            {
                let mut items = self.items.lock().await;
                let mut in_flight = self.in_flight.lock().await;
                if let Some(index) = items
                    .iter()
                    .position(|item| !in_flight.contains(&item.queue_key()))
                {
                    let item = items.remove(index).expect("index just located");
                    in_flight.insert(item.queue_key());
                    return Some(item);
                }
                if self.shutdown.load(Ordering::SeqCst) && items.is_empty() {
                    return None;
                }
            }
            tokio::select! {
                _ = self.notify.notified() => {}
                _ = cancel.cancelled() => {
                    if self.items.lock().await.is_empty() {
                        return None;
                    }
                }
            }
        }
    }

    async fn done(&self, queue_key: &str) {
        self.in_flight.lock().await.remove(queue_key);
        self.notify.notify_waiters();
    }

    fn shut_down(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }
}

/// Per-sync-target engine: owns the work queue, the resource-syncer
/// registry keyed by GVR, and the worker pool that drains it.
pub struct SyncEngine {
    config: SyncEngineConfig,
    syncers: DashMap<String, Arc<ResourceSyncer>>,
    status: DashMap<String, SyncStatus>,
    queue: Arc<WorkQueue>,
    cancellation_token: CancellationToken,
    connected: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
    retry_policy: RetryPolicy,
}

impl SyncEngine {
    pub fn new(config: SyncEngineConfig) -> Self {
        Self {
            config,
            syncers: DashMap::new(),
            status: DashMap::new(),
            queue: Arc::new(WorkQueue::new()),
            cancellation_token: CancellationToken::new(),
            connected: AtomicBool::new(false),
            workers: Mutex::new(Vec::new()),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn register_syncer(&self, gvr: impl Into<String>, syncer: Arc<ResourceSyncer>) -> TmcResult<()> {
        let gvr = gvr.into();
        if self.syncers.contains_key(&gvr) {
            return Err(TmcError::new(
                ErrorKind::ResourceConflict,
                "sync-engine",
                "register_syncer",
                format!("resource syncer already registered for {gvr}"),
            ));
        }
        self.syncers.insert(gvr.clone(), syncer);
        self.status.entry(gvr).or_default();
        Ok(())
    }

    pub async fn enqueue(&self, item: SyncItem) {
        self.queue.push(item).await;
    }

    pub fn status(&self, gvr: &str) -> Option<SyncStatus> {
        self.status.get(gvr).map(|entry| entry.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Waits for the event source's cache sync, then launches the worker
    /// pool and the event-dispatch task. Wiring upstream/downstream event
    /// handlers to `{Add,Update,Delete}`/`Status` items is the event
    /// source's responsibility; this only drains what it emits.
    pub async fn start(self: &Arc<Self>, event_source: Arc<dyn EventSource>) -> TmcResult<()> {
        let synced = event_source.wait_for_cache_sync().await?;
        if let Some((gvr, _)) = synced.iter().find(|(_, ok)| !**ok) {
            return Err(TmcError::new(
                ErrorKind::SyncTimeout,
                "sync-engine",
                "start",
                format!("cache failed to sync for {gvr}"),
            ));
        }

        self.connected.store(true, Ordering::SeqCst);

        let mut workers = self.workers.lock().await;
        for id in 0..self.config.worker_count {
            let engine = self.clone();
            workers.push(tokio::spawn(async move {
                engine.run_worker(id).await;
            }));
        }

        let engine = self.clone();
        let dispatch_source = event_source.clone();
        let cancel = self.cancellation_token.clone();
        workers.push(tokio::spawn(async move {
            engine.run_dispatch(dispatch_source, cancel).await;
        }));

        debug!(workers = self.config.worker_count, "sync engine started");
        Ok(())
    }

    async fn run_dispatch(self: Arc<Self>, source: Arc<dyn EventSource>, cancel: CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = source.next_event() => event,
            };
            let Some(event) = event else { break };
            let item = match event {
                ResourceEvent::Add { gvr, object } => {
                    let key = object_key(&object);
                    SyncItem::new(gvr, key, SyncAction::Add).with_object(object)
                }
                ResourceEvent::Update { gvr, new, .. } => {
                    let key = object_key(&new);
                    SyncItem::new(gvr, key, SyncAction::Update).with_object(new)
                }
                ResourceEvent::Delete { gvr, object } => {
                    let key = object_key(&object);
                    SyncItem::new(gvr, key, SyncAction::Delete)
                }
            };
            self.queue.push(item).await;
        }
    }

    async fn run_worker(self: Arc<Self>, id: usize) {
        loop {
            let Some(mut item) = self.queue.pop(&self.cancellation_token).await else {
                break;
            };
            let queue_key = item.queue_key();
            let Some(syncer) = self.syncers.get(&item.gvr).map(|entry| entry.clone()) else {
                warn!(worker = id, gvr = %item.gvr, "no resource syncer registered, dropping item");
                self.queue.done(&queue_key).await;
                continue;
            };

            match syncer.process(&item).await {
                Ok(()) => {
                    if let Some(mut status) = self.status.get_mut(&item.gvr) {
                        status.record_success();
                    }
                }
                Err(err) => {
                    error!(worker = id, gvr = %item.gvr, key = %item.key, error = %err, "sync item failed");
                    if item.retries >= self.config.max_retries {
                        if let Some(mut status) = self.status.get_mut(&item.gvr) {
                            status.record_failure(err.to_string());
                        }
                    } else {
                        item.retries += 1;
                        if let Some(mut status) = self.status.get_mut(&item.gvr) {
                            status.record_pending();
                        }
                        let delay = self.retry_policy.delay_for(item.retries);
                        self.queue.push_after(item, delay).await;
                    }
                }
            }
            self.queue.done(&queue_key).await;
        }
    }

    /// Cancels the engine, shuts down the queue, waits for workers to
    /// join, and marks the engine disconnected. Idempotent.
    pub async fn stop(&self) {
        if self.cancellation_token.is_cancelled() {
            return;
        }
        self.cancellation_token.cancel();
        self.queue.shut_down();
        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            let _ = handle.await;
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

fn object_key(object: &crate::object::UnstructuredObject) -> String {
    let namespace = object
        .value()
        .get("metadata")
        .and_then(|m| m.get("namespace"))
        .and_then(|n| n.as_str());
    let name = object
        .value()
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default();
    match namespace {
        Some(ns) => format!("{ns}/{name}"),
        None => name.to_string(),
    }
}
