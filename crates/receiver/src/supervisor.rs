use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use kobs_config::ResolvedPlan;
use kobs_core::ObservationMode;
use kobs_kubehub::{ClientError, ClientFactory, ResourceClient};

use crate::consumer::LogsConsumer;
use crate::error::ReceiverError;
use crate::pull_worker::run_pull_worker;
use crate::watch_worker::run_watch_worker;

const CREATED: u8 = 0;
const STARTED: u8 = 1;
const STOPPED: u8 = 2;

/// The Receiver Supervisor (spec.md §4.5): owns the client, spawns one
/// worker per `(resource, namespace, mode)` on `start`, and provides a
/// single cancellation anchor for `shutdown`. Generalizes the teacher's
/// per-task `CancellationToken`/`oneshot` worker-control shape
/// (`gui::tasks::watch_ctrl::ensure_watch_for_selection`) into a
/// registry of many concurrently running workers fanned into one
/// `JoinSet`.
pub struct ObjectsReceiver {
    client: Arc<dyn ResourceClient>,
    consumer: Arc<dyn LogsConsumer>,
    entries: Vec<kobs_config::ResolvedObservation>,
    state: AtomicU8,
    cancel: Mutex<Option<CancellationToken>>,
    tasks: Mutex<JoinSet<()>>,
}

impl ObjectsReceiver {
    /// Builds the dynamic client via the injected factory and flattens
    /// the grouped plan into a single sequence of resolved entries
    /// (spec.md §4.5). Does not start workers.
    pub async fn construct(
        factory: Arc<dyn ClientFactory>,
        plan: ResolvedPlan,
        consumer: Arc<dyn LogsConsumer>,
    ) -> Result<Self, ClientError> {
        let client = factory.build().await?;
        Ok(Self {
            client,
            consumer,
            entries: plan.entries,
            state: AtomicU8::new(CREATED),
            cancel: Mutex::new(None),
            tasks: Mutex::new(JoinSet::new()),
        })
    }

    /// Derives a cancellable child context from `ctx`, then spawns all
    /// workers. Returns immediately; workers run until `shutdown`.
    /// A double start logs a warning and is a no-op (spec.md §4.5:
    /// invalid transitions are tolerated, not fatal).
    pub async fn start(&self, ctx: CancellationToken) -> Result<(), ReceiverError> {
        if self.state.compare_exchange(CREATED, STARTED, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            warn!("receiver start called more than once, ignoring");
            return Ok(());
        }

        let child = ctx.child_token();
        let mut tasks = self.tasks.lock().await;
        for entry in &self.entries {
            let namespaces: Vec<Option<String>> =
                if entry.namespaces.is_empty() { vec![None] } else { entry.namespaces.iter().cloned().map(Some).collect() };

            for namespace in namespaces {
                let client = self.client.clone();
                let consumer = self.consumer.clone();
                let entry = entry.clone();
                let cancel = child.clone();
                match entry.mode {
                    ObservationMode::Pull => {
                        tasks.spawn(run_pull_worker(client, consumer, entry, namespace, cancel));
                    }
                    ObservationMode::Watch => {
                        tasks.spawn(run_watch_worker(client, consumer, entry, namespace, cancel));
                    }
                }
            }
        }
        drop(tasks);

        *self.cancel.lock().await = Some(child);
        Ok(())
    }

    /// Cancels the child context, which causes every worker to
    /// terminate and every open watch to be stopped. Idempotent: a
    /// second call observes the token already cancelled and returns
    /// immediately. Does not block on worker drain (spec.md §5:
    /// fire-and-forget); see `shutdown_and_wait` for a bounded join.
    pub async fn shutdown(&self) -> Result<(), ReceiverError> {
        self.state.store(STOPPED, Ordering::SeqCst);
        if let Some(cancel) = self.cancel.lock().await.as_ref() {
            cancel.cancel();
        }
        Ok(())
    }

    /// Cancels and then waits up to `timeout` for every spawned worker
    /// to finish (spec.md §5: "implementations MAY strengthen this to a
    /// join with a bounded timeout"). Workers still running past the
    /// deadline are left to finish on their own; their tasks are simply
    /// no longer awaited here.
    pub async fn shutdown_and_wait(&self, timeout: Duration) -> Result<(), ReceiverError> {
        self.shutdown().await?;
        let mut tasks = self.tasks.lock().await;
        let _ = tokio::time::timeout(timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kobs_config::{ResolvedObservation, ResolvedPlan};
    use kobs_core::{GroupVersionResource, Logs, UnstructuredList};
    use kobs_kubehub::{MockResourceClient, StaticClientFactory};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration as StdDuration;

    struct CountingConsumer(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl LogsConsumer for CountingConsumer {
        async fn consume_logs(&self, _logs: Logs) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn pull_entry(namespaces: Vec<String>) -> ResolvedObservation {
        ResolvedObservation {
            name: "pods".into(),
            namespaces,
            mode: ObservationMode::Pull,
            label_selector: String::new(),
            field_selector: String::new(),
            interval: Some(StdDuration::from_millis(5)),
            gvr: GroupVersionResource::new("", "v1", "pods"),
        }
    }

    #[tokio::test]
    async fn start_spawns_one_task_per_namespace() {
        let mock = Arc::new(MockResourceClient::new());
        for _ in 0..40 {
            mock.push_list_result(Ok(UnstructuredList { api_version: "v1".into(), resource_version: "1".into(), items: vec![] }));
        }
        let factory = Arc::new(StaticClientFactory(mock as Arc<dyn ResourceClient>));
        let deliveries = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer(deliveries));
        let plan = ResolvedPlan { entries: vec![pull_entry(vec!["a".into(), "b".into()])] };

        let receiver = ObjectsReceiver::construct(factory, plan, consumer).await.unwrap();
        receiver.start(CancellationToken::new()).await.unwrap();
        assert_eq!(receiver.tasks.lock().await.len(), 2);
        receiver.shutdown_and_wait(StdDuration::from_millis(200)).await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_delivery_and_is_idempotent() {
        let mock = Arc::new(MockResourceClient::new());
        for _ in 0..200 {
            mock.push_list_result(Ok(UnstructuredList {
                api_version: "v1".into(),
                resource_version: "1".into(),
                items: vec![kobs_core::UnstructuredObject::new(serde_json::json!({"kind": "Pod", "apiVersion": "v1"}))],
            }));
        }
        let factory = Arc::new(StaticClientFactory(mock as Arc<dyn ResourceClient>));
        let deliveries = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer(deliveries.clone()));
        let plan = ResolvedPlan { entries: vec![pull_entry(vec![])] };

        let receiver = ObjectsReceiver::construct(factory, plan, consumer).await.unwrap();
        receiver.start(CancellationToken::new()).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        receiver.shutdown().await.unwrap();
        receiver.shutdown().await.unwrap();
        let after_first_shutdown = deliveries.load(Ordering::SeqCst);
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        assert_eq!(deliveries.load(Ordering::SeqCst), after_first_shutdown, "no further ConsumeLogs calls after shutdown");
    }

    #[tokio::test]
    async fn double_start_is_a_warned_no_op() {
        let mock = Arc::new(MockResourceClient::new());
        for _ in 0..40 {
            mock.push_list_result(Ok(UnstructuredList { api_version: "v1".into(), resource_version: "1".into(), items: vec![] }));
        }
        let factory = Arc::new(StaticClientFactory(mock as Arc<dyn ResourceClient>));
        let deliveries = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer(deliveries));
        let plan = ResolvedPlan { entries: vec![pull_entry(vec![])] };

        let receiver = ObjectsReceiver::construct(factory, plan, consumer).await.unwrap();
        receiver.start(CancellationToken::new()).await.unwrap();
        receiver.start(CancellationToken::new()).await.unwrap();
        assert_eq!(receiver.tasks.lock().await.len(), 1, "a second start must not spawn duplicate workers");
        receiver.shutdown_and_wait(StdDuration::from_millis(200)).await.unwrap();
    }
}
