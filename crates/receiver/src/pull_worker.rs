use std::sync::Arc;

use metrics::counter;
use tokio_util::sync::CancellationToken;
use tracing::error;

use kobs_config::ResolvedObservation;
use kobs_kubehub::{ListOpts, ResourceClient};
use kobs_mapper::map_unstructured_list;

use crate::consumer::LogsConsumer;
use crate::ticker::SelfPrimingTicker;

/// Pull worker (spec.md §4.4): every `entry.interval`, lists the target
/// scope and delivers a non-empty result as one `Logs` envelope. An
/// empty result is a silent no-op (spec.md: "an empty snapshot is not
/// informative"). Exits on cancellation.
///
/// `validate()` guarantees `entry.interval.is_some()` for pull-mode
/// entries (kobs_config::validate step 4); the ticker's own fail-fast
/// check is a second, independent guard against a worker constructed
/// directly from a hand-built `ResolvedObservation` in a test.
pub async fn run_pull_worker(
    client: Arc<dyn ResourceClient>,
    consumer: Arc<dyn LogsConsumer>,
    entry: ResolvedObservation,
    namespace: Option<String>,
    cancel: CancellationToken,
) {
    let interval = match entry.interval {
        Some(d) => d,
        None => {
            error!(gvr = %entry.gvr, "pull worker has no interval configured, exiting");
            return;
        }
    };
    let mut ticker = match SelfPrimingTicker::new(interval) {
        Ok(t) => t,
        Err(e) => {
            error!(gvr = %entry.gvr, error = %e, "pull worker rejected its own interval, exiting");
            return;
        }
    };
    let opts = ListOpts::new(entry.label_selector.clone(), entry.field_selector.clone());

    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            _ = ticker.tick() => {
                // The in-flight list is itself cancellable: a shutdown that
                // lands mid-request must not wait for a hung round trip
                // (spec.md §5: cancellation must propagate to any in-flight
                // API call), and serializing this inner select inside the
                // outer loop — rather than racing the ticker concurrently
                // with the list — is what keeps a slow list from coalescing
                // the next tick into a burst (spec.md §4.4 edge case).
                tokio::select! {
                    () = cancel.cancelled() => return,
                    result = client.list(&entry.gvr, namespace.as_deref(), &opts) => {
                        match result {
                            Err(e) => {
                                error!(gvr = %entry.gvr, namespace = ?namespace, error = %e, "pull: list failed");
                                counter!("kobs_receiver_pull_list_errors_total", 1);
                            }
                            Ok(list) if list.items.is_empty() => {}
                            Ok(list) => {
                                counter!("kobs_receiver_pull_items_total", list.items.len() as u64);
                                let logs = map_unstructured_list(&list);
                                if let Err(e) = consumer.consume_logs(logs).await {
                                    error!(gvr = %entry.gvr, namespace = ?namespace, error = %e, "pull: delivery failed");
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kobs_core::{GroupVersionResource, ObservationMode, UnstructuredList};
    use kobs_kubehub::MockResourceClient;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn entry(interval: Option<Duration>) -> ResolvedObservation {
        ResolvedObservation {
            name: "pods".into(),
            namespaces: vec![],
            mode: ObservationMode::Pull,
            label_selector: String::new(),
            field_selector: String::new(),
            interval,
            gvr: GroupVersionResource::new("", "v1", "pods"),
        }
    }

    struct CountingConsumer(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl LogsConsumer for CountingConsumer {
        async fn consume_logs(&self, _logs: kobs_core::Logs) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_interval_exits_without_panicking() {
        let client = Arc::new(MockResourceClient::new());
        let deliveries = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer(deliveries.clone()));
        let cancel = CancellationToken::new();

        run_pull_worker(client, consumer, entry(None), None, cancel).await;
        assert_eq!(deliveries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_list_is_a_silent_no_op() {
        let client = Arc::new(MockResourceClient::new());
        client.push_list_result(Ok(UnstructuredList { api_version: "v1".into(), resource_version: "1".into(), items: vec![] }));
        let deliveries = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer(deliveries.clone()));
        let cancel = CancellationToken::new();
        let cancel_for_worker = cancel.clone();

        let handle = tokio::spawn(run_pull_worker(
            client,
            consumer,
            entry(Some(Duration::from_millis(5))),
            None,
            cancel_for_worker,
        ));
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(deliveries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_empty_list_is_delivered() {
        let client = Arc::new(MockResourceClient::new());
        client.push_list_result(Ok(UnstructuredList {
            api_version: "v1".into(),
            resource_version: "7".into(),
            items: vec![kobs_core::UnstructuredObject::new(serde_json::json!({
                "kind": "Pod", "apiVersion": "v1", "metadata": {"name": "web-0"},
            }))],
        }));
        let deliveries = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer(deliveries.clone()));
        let cancel = CancellationToken::new();
        let cancel_for_worker = cancel.clone();

        let handle = tokio::spawn(run_pull_worker(
            client,
            consumer,
            entry(Some(Duration::from_millis(200))),
            None,
            cancel_for_worker,
        ));
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(deliveries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_further_deliveries() {
        let client = Arc::new(MockResourceClient::new());
        for _ in 0..20 {
            client.push_list_result(Ok(UnstructuredList {
                api_version: "v1".into(),
                resource_version: "1".into(),
                items: vec![kobs_core::UnstructuredObject::new(serde_json::json!({"kind": "Pod", "apiVersion": "v1"}))],
            }));
        }
        let deliveries = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer(deliveries.clone()));
        let cancel = CancellationToken::new();
        let cancel_for_worker = cancel.clone();

        let handle = tokio::spawn(run_pull_worker(
            client,
            consumer,
            entry(Some(Duration::from_millis(1))),
            None,
            cancel_for_worker,
        ));
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
        handle.await.unwrap();
        let seen_at_cancel = deliveries.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(deliveries.load(Ordering::SeqCst), seen_at_cancel, "no ConsumeLogs calls after shutdown");
    }
}
