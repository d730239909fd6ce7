use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use kobs_core::WatchEvent;

/// A long-lived, non-restartable watch stream (spec.md §4.2). Events are
/// produced by a background task (see `client::spawn_watch_forwarder`)
/// and read here one at a time; `stop` is idempotent and releases the
/// upstream connection by cancelling the shared token and joining the
/// forwarding task, the same shape `b4n-kube`'s watcher uses a
/// `CancellationToken` for.
pub struct WatchHandle {
    rx: mpsc::Receiver<WatchEvent>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub(crate) fn new(rx: mpsc::Receiver<WatchEvent>, cancel: CancellationToken, task: JoinHandle<()>) -> Self {
        Self { rx, cancel, task: Some(task) }
    }

    /// Returns the next event, or `None` once the server closes the
    /// stream (or it was stopped and fully drained).
    pub async fn next_event(&mut self) -> Option<WatchEvent> {
        self.rx.recv().await
    }

    /// Idempotent: a second call is a no-op.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}
