//! Observation Workers and the Receiver Supervisor (spec.md §4.4–§4.5):
//! the self-priming pull worker, the long-lived watch worker, and the
//! `ObjectsReceiver` that owns their lifecycle and cancellation.

#![forbid(unsafe_code)]

mod consumer;
mod error;
mod pull_worker;
mod supervisor;
mod ticker;
mod watch_worker;

pub use consumer::LogsConsumer;
pub use error::ReceiverError;
pub use supervisor::ObjectsReceiver;
pub use ticker::SelfPrimingTicker;
