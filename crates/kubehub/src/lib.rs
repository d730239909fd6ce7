//! Resource Client Adapter (spec.md §4.2): a thin, mockable abstraction
//! over the dynamic Kubernetes API — `list`, `watch`, namespace scoping,
//! selector options — plus the discovery adapter the Configuration &
//! Validator resolves GVRs against.
//!
//! Generalized from `orka-kubehub`'s `discover`/`start_watcher` free
//! functions into the `DiscoveryClient`/`ResourceClient` traits so both
//! halves are replaceable with test doubles (spec.md §9 "Client injection").

#![forbid(unsafe_code)]

mod client;
mod discovery;
mod error;
mod factory;
mod opts;
mod watch_handle;

#[cfg(feature = "mocks")]
mod mock;

pub use client::{KubeResourceClient, ResourceClient};
pub use discovery::{DiscoveredResources, DiscoveryClient, KubeDiscoveryClient};
pub use error::ClientError;
pub use factory::{ClientFactory, DefaultClientFactory};
pub use opts::ListOpts;
pub use watch_handle::WatchHandle;

#[cfg(feature = "mocks")]
pub use discovery::mock::MockDiscoveryClient;
#[cfg(feature = "mocks")]
pub use mock::{MockResourceClient, StaticClientFactory};

/// Acquires the production `kube::Client` from the execution environment
/// (in-cluster service account, falling back to a local kubeconfig for
/// out-of-cluster runs) — the same call `orka-kubehub` makes via
/// `Client::try_default()`.
pub async fn default_client() -> Result<kube::Client, ClientError> {
    kube::Client::try_default().await.map_err(|e| ClientError::ClientAcquisition(e.to_string()))
}
