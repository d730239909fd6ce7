use async_trait::async_trait;

use kobs_core::Logs;

/// The downstream log-pipeline consumer (spec.md §4.5/§6: "Log consumer
/// (`ConsumeLogs(ctx, Logs) → error`)"). A delivery failure is logged by
/// the calling worker and is never fatal (spec.md §7 item 6).
#[async_trait]
pub trait LogsConsumer: Send + Sync {
    async fn consume_logs(&self, logs: Logs) -> anyhow::Result<()>;
}
