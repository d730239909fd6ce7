use async_trait::async_trait;
use futures::{Stream, StreamExt};
use kube::{
    api::{Api, DynamicObject, ListParams, WatchEvent as KubeWatchEvent, WatchParams},
    core::ApiResource,
    discovery::{Discovery, Scope},
    Client,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use kobs_core::{GroupVersion, GroupVersionResource, UnstructuredList, UnstructuredObject, WatchEvent, WatchEventType};

use crate::error::ClientError;
use crate::opts::ListOpts;
use crate::watch_handle::WatchHandle;

/// Resource Client Adapter (spec.md §4.2): `list`/`watch`, namespace
/// scoping, selector options. Generalizes `orka-kubehub`'s free
/// functions (`discover`/`start_watcher`) into a trait so tests can
/// substitute a fixed double (`mock::MockResourceClient`).
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list(
        &self,
        gvr: &GroupVersionResource,
        namespace: Option<&str>,
        opts: &ListOpts,
    ) -> Result<UnstructuredList, ClientError>;

    async fn watch(
        &self,
        gvr: &GroupVersionResource,
        namespace: Option<&str>,
        opts: &ListOpts,
    ) -> Result<WatchHandle, ClientError>;
}

/// Production implementation built on `kube::Client` + `kube::discovery::Discovery`,
/// the same `Discovery::new(client).run()` / `Api::all_with` / `Api::namespaced_with`
/// pattern `orka-kubehub::discover` / `start_watcher` use, generalized to accept
/// selectors and arbitrary namespace scoping.
pub struct KubeResourceClient {
    client: Client,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn resolve(&self, gvr: &GroupVersionResource) -> Result<(ApiResource, bool), ClientError> {
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(|e| ClientError::Discovery(e.to_string()))?;
        let wanted = gvr.group_version();
        for group in discovery.groups() {
            for (ar, caps) in group.recommended_resources() {
                if GroupVersion::new(ar.group.clone(), ar.version.clone()) == wanted && ar.plural == gvr.resource {
                    return Ok((ar.clone(), matches!(caps.scope, Scope::Namespaced)));
                }
            }
        }
        Err(ClientError::ResourceNotFound { resource: gvr.to_string() })
    }

    fn api_for(&self, ar: &ApiResource, namespaced: bool, namespace: Option<&str>) -> Api<DynamicObject> {
        match (namespaced, namespace) {
            (true, Some(ns)) => Api::namespaced_with(self.client.clone(), ns, ar),
            _ => Api::all_with(self.client.clone(), ar),
        }
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn list(
        &self,
        gvr: &GroupVersionResource,
        namespace: Option<&str>,
        opts: &ListOpts,
    ) -> Result<UnstructuredList, ClientError> {
        let (ar, namespaced) = self.resolve(gvr).await?;
        let api = self.api_for(&ar, namespaced, namespace);
        let lp = to_list_params(opts);
        let list = api
            .list(&lp)
            .await
            .map_err(|e| ClientError::List { gvr: gvr.to_string(), source: e.to_string() })?;
        Ok(UnstructuredList {
            api_version: list.types.api_version.clone(),
            resource_version: list.metadata.resource_version.clone().unwrap_or_default(),
            items: list.items.into_iter().map(to_unstructured).collect(),
        })
    }

    async fn watch(
        &self,
        gvr: &GroupVersionResource,
        namespace: Option<&str>,
        opts: &ListOpts,
    ) -> Result<WatchHandle, ClientError> {
        let (ar, namespaced) = self.resolve(gvr).await?;
        let api = self.api_for(&ar, namespaced, namespace);
        let wp = to_watch_params(opts);

        let stream = api.watch(&wp, "0").await.map_err(|e| {
            let status_reason = match &e {
                kube::Error::Api(resp) => Some(resp.reason.clone()),
                _ => None,
            };
            ClientError::Watch { gvr: gvr.to_string(), source: e.to_string(), status_reason }
        })?;

        let (tx, rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        // `Box::pin` makes the stream `Unpin` regardless of whether the
        // concrete stream type returned by `api.watch` is, so it can be
        // read via `StreamExt::next` inside `forward_events`.
        let task = tokio::spawn(forward_events(Box::pin(stream), tx, cancel.clone(), gvr.to_string()));
        Ok(WatchHandle::new(rx, cancel, task))
    }
}

fn to_list_params(opts: &ListOpts) -> ListParams {
    let mut lp = ListParams::default();
    if !opts.label_selector.is_empty() {
        lp = lp.labels(&opts.label_selector);
    }
    if !opts.field_selector.is_empty() {
        lp = lp.fields(&opts.field_selector);
    }
    lp
}

fn to_watch_params(opts: &ListOpts) -> WatchParams {
    let mut wp = WatchParams::default();
    if !opts.label_selector.is_empty() {
        wp = wp.labels(&opts.label_selector);
    }
    if !opts.field_selector.is_empty() {
        wp = wp.fields(&opts.field_selector);
    }
    wp
}

fn to_unstructured(obj: DynamicObject) -> UnstructuredObject {
    UnstructuredObject::new(serde_json::to_value(&obj).unwrap_or(serde_json::Value::Null))
}

fn bookmark_to_unstructured(bk: kube::api::Bookmark) -> UnstructuredObject {
    UnstructuredObject::new(serde_json::json!({
        "metadata": { "resourceVersion": bk.metadata.resource_version },
    }))
}

fn error_response_to_unstructured(err: &kube::core::ErrorResponse) -> UnstructuredObject {
    UnstructuredObject::new(serde_json::json!({
        "status": { "message": err.message, "reason": err.reason, "code": err.code },
    }))
}

/// Reads the raw watch stream until it ends or `cancel` fires, forwarding
/// every event (ADDED/MODIFIED/DELETED/BOOKMARK/ERROR) uniformly per
/// spec.md §4.4. A stream-level transport error ends the forwarder —
/// the watch worker observes this as the channel closing, the same exit
/// path as a server-side close (spec.md §4.4 step 4).
async fn forward_events(
    mut stream: impl Stream<Item = Result<KubeWatchEvent<DynamicObject>, kube::Error>> + Unpin,
    tx: mpsc::Sender<WatchEvent>,
    cancel: CancellationToken,
    gvr: String,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            item = stream.next() => {
                match item {
                    None => break,
                    Some(Err(e)) => {
                        error!(gvr = %gvr, error = %e, "watch stream failed");
                        break;
                    }
                    Some(Ok(event)) => {
                        let mapped = match event {
                            KubeWatchEvent::Added(o) => WatchEvent::new(WatchEventType::Added, to_unstructured(o)),
                            KubeWatchEvent::Modified(o) => WatchEvent::new(WatchEventType::Modified, to_unstructured(o)),
                            KubeWatchEvent::Deleted(o) => WatchEvent::new(WatchEventType::Deleted, to_unstructured(o)),
                            KubeWatchEvent::Bookmark(bk) => WatchEvent::new(WatchEventType::Bookmark, bookmark_to_unstructured(bk)),
                            KubeWatchEvent::Error(err) => {
                                warn!(gvr = %gvr, reason = %err.reason, "watch error event (permission or desync)");
                                WatchEvent::new(WatchEventType::Error, error_response_to_unstructured(&err))
                            }
                        };
                        if tx.send(mapped).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
}
