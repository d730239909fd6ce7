use thiserror::Error;

/// Errors surfaced by the Receiver Supervisor itself (spec.md §7): the
/// adapter-level failures (`ClientError`) are a separate taxonomy,
/// surfaced directly from `construct`. Double start/shutdown are not
/// errors here (spec.md §4.5: invalid transitions are tolerated, not
/// fatal) — this taxonomy only covers the ticker's fail-fast check.
#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("self-priming ticker requires a positive interval")]
    InvalidInterval,
}
