use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{KubeResourceClient, ResourceClient};
use crate::error::ClientError;

/// Builds the dynamic resource client (spec.md §4.5: "construct ...
/// builds the dynamic client via the injected factory"). Pluggable so
/// the supervisor can be constructed against a fixed double in tests
/// without touching a real cluster (spec.md §9 "Client injection").
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn ResourceClient>, ClientError>;
}

/// Production factory: acquires in-cluster (or local kubeconfig, via
/// `kube::Client::try_default`'s own fallback) credentials.
pub struct DefaultClientFactory;

#[async_trait]
impl ClientFactory for DefaultClientFactory {
    async fn build(&self) -> Result<Arc<dyn ResourceClient>, ClientError> {
        let client = crate::default_client().await?;
        Ok(Arc::new(KubeResourceClient::new(client)) as Arc<dyn ResourceClient>)
    }
}
