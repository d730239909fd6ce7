//! Hand-rolled test doubles for `ResourceClient`, gated behind the
//! `mocks` feature — grounded in `lib/k8s-runtime/src/watcher/mock.rs`'s
//! scenario-driven `Mock<T>` from the `vector` pack entry, simplified to
//! fixed canned responses (none of this pack's kube-native repos reach
//! for a mocking framework; a hand-written double matches their texture).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use kobs_core::{GroupVersionResource, UnstructuredList, WatchEvent};

use crate::client::ResourceClient;
use crate::error::ClientError;
use crate::factory::ClientFactory;
use crate::opts::ListOpts;
use crate::watch_handle::WatchHandle;

/// A `ResourceClient` double returning pre-scripted `list` results (one
/// per call, consumed in order) and a fixed sequence of watch events.
/// `stop_calls` lets a test assert `WatchHandle::stop` was observed
/// exactly once (spec.md §8 scenario 6).
pub struct MockResourceClient {
    list_responses: Mutex<VecDeque<Result<UnstructuredList, ClientError>>>,
    watch_events: Mutex<Option<Vec<WatchEvent>>>,
    watch_error: Mutex<Option<ClientError>>,
    pub stop_calls: Arc<AtomicUsize>,
}

impl MockResourceClient {
    pub fn new() -> Self {
        Self {
            list_responses: Mutex::new(VecDeque::new()),
            watch_events: Mutex::new(None),
            watch_error: Mutex::new(None),
            stop_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn push_list_result(&self, result: Result<UnstructuredList, ClientError>) {
        self.list_responses.lock().unwrap().push_back(result);
    }

    pub fn set_watch_events(&self, events: Vec<WatchEvent>) {
        *self.watch_events.lock().unwrap() = Some(events);
    }

    pub fn fail_watch(&self, err: ClientError) {
        *self.watch_error.lock().unwrap() = Some(err);
    }
}

impl Default for MockResourceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    async fn list(
        &self,
        gvr: &GroupVersionResource,
        _namespace: Option<&str>,
        _opts: &ListOpts,
    ) -> Result<UnstructuredList, ClientError> {
        self.list_responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ClientError::List { gvr: gvr.to_string(), source: "mock exhausted".into() })
        })
    }

    async fn watch(
        &self,
        _gvr: &GroupVersionResource,
        _namespace: Option<&str>,
        _opts: &ListOpts,
    ) -> Result<WatchHandle, ClientError> {
        if let Some(err) = self.watch_error.lock().unwrap().take() {
            return Err(err);
        }
        let events = self.watch_events.lock().unwrap().take().unwrap_or_default();
        Ok(spawn_mock_watch(events, self.stop_calls.clone()))
    }
}

/// A `ClientFactory` that hands back a fixed, already-constructed
/// `ResourceClient` — lets a test build an `ObjectsReceiver` against a
/// `MockResourceClient` without a real cluster (spec.md §9 "Client
/// injection").
pub struct StaticClientFactory(pub Arc<dyn ResourceClient>);

#[async_trait]
impl ClientFactory for StaticClientFactory {
    async fn build(&self) -> Result<Arc<dyn ResourceClient>, ClientError> {
        Ok(self.0.clone())
    }
}

fn spawn_mock_watch(events: Vec<WatchEvent>, stop_calls: Arc<AtomicUsize>) -> WatchHandle {
    let (tx, rx) = mpsc::channel(events.len().max(1));
    let cancel = CancellationToken::new();
    let cancel_for_task = cancel.clone();
    let task = tokio::spawn(async move {
        for event in events {
            if tx.send(event).await.is_err() {
                return;
            }
        }
        // Hold the sender open (as a real watch connection would) until stopped.
        cancel_for_task.cancelled().await;
        stop_calls.fetch_add(1, Ordering::SeqCst);
    });
    WatchHandle::new(rx, cancel, task)
}
