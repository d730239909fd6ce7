//! Shared types for the object-observation engine.
//!
//! This crate owns the data that crosses module boundaries: the
//! group/version/resource identity of a collected resource, the
//! open-schema attribute-value tree, the `Logs` output envelope, and the
//! configuration error taxonomy. It has no async runtime or Kubernetes
//! client dependency — those live in `kobs-kubehub`.

#![forbid(unsafe_code)]

mod attribute;
mod error;
mod gvr;
mod logs;
mod object;
mod watch;

pub use attribute::AttributeValue;
pub use error::ConfigError;
pub use gvr::{GroupVersion, GroupVersionResource, ObservationMode};
pub use logs::{LogRecord, Logs, ResourceLogs, ScopeLogs};
pub use object::{UnstructuredList, UnstructuredObject};
pub use watch::{WatchEvent, WatchEventType};

pub mod prelude {
    pub use crate::{
        AttributeValue, ConfigError, GroupVersion, GroupVersionResource, LogRecord, Logs,
        ObservationMode, ResourceLogs, ScopeLogs, UnstructuredList, UnstructuredObject, WatchEvent,
        WatchEventType,
    };
}
