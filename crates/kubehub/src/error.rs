use thiserror::Error;

/// Errors surfaced by the Resource Client Adapter (spec.md §7, items 2–5).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build dynamic client: {0}")]
    ClientAcquisition(String),

    #[error("discovery request failed: {0}")]
    Discovery(String),

    #[error("resource {resource} not found in discovery")]
    ResourceNotFound { resource: String },

    #[error("list request failed for {gvr}: {source}")]
    List { gvr: String, source: String },

    #[error("watch request failed for {gvr}: {source}; status_reason={status_reason:?}")]
    Watch { gvr: String, source: String, status_reason: Option<String> },
}
