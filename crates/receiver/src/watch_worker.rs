use std::sync::Arc;

use metrics::counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use kobs_config::ResolvedObservation;
use kobs_kubehub::{ListOpts, ResourceClient};
use kobs_mapper::map_watch_event;

use crate::consumer::LogsConsumer;

/// Watch worker (spec.md §4.4): opens one watch stream and forwards
/// every event until the channel closes or the supervisor cancels. No
/// restart on error or server-side close (spec.md §9 Open Question,
/// decided in SPEC_FULL.md: terminate and rely on the supervisor).
pub async fn run_watch_worker(
    client: Arc<dyn ResourceClient>,
    consumer: Arc<dyn LogsConsumer>,
    entry: ResolvedObservation,
    namespace: Option<String>,
    cancel: CancellationToken,
) {
    let opts = ListOpts::new(entry.label_selector.clone(), entry.field_selector.clone());

    let mut handle = tokio::select! {
        () = cancel.cancelled() => return,
        result = client.watch(&entry.gvr, namespace.as_deref(), &opts) => match result {
            Ok(h) => h,
            Err(e) => {
                error!(gvr = %entry.gvr, namespace = ?namespace, error = %e, "watch: open failed, exiting");
                counter!("kobs_receiver_watch_open_errors_total", 1);
                return;
            }
        },
    };

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                handle.stop().await;
                return;
            }
            event = handle.next_event() => match event {
                None => {
                    debug!(gvr = %entry.gvr, namespace = ?namespace, "watch: stream closed, exiting");
                    return;
                }
                Some(event) => {
                    counter!("kobs_receiver_watch_events_total", 1);
                    let logs = map_watch_event(&event);
                    if let Err(e) = consumer.consume_logs(logs).await {
                        error!(gvr = %entry.gvr, namespace = ?namespace, error = %e, "watch: delivery failed");
                    }
                }
            }
        }
    }
}
