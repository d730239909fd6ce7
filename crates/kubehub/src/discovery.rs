use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use kobs_core::GroupVersion;
use kube::{discovery::Discovery, Client};

use crate::error::ClientError;

/// The view of the cluster's served resources the Configuration &
/// Validator needs: `serverPreferredResources` (spec.md §4.2/§4.3),
/// narrowed to what `validate` actually checks membership against.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredResources {
    pub groups: HashMap<GroupVersion, HashSet<String>>,
}

impl DiscoveredResources {
    pub fn has_group(&self, gv: &GroupVersion) -> bool {
        self.groups.contains_key(gv)
    }

    pub fn has_resource(&self, gv: &GroupVersion, resource: &str) -> bool {
        self.groups.get(gv).map(|names| names.contains(resource)).unwrap_or(false)
    }
}

/// Discovery adapter (spec.md §4.2). Pluggable so `Validate` can be
/// exercised against a fixed fake in tests (spec.md §8 scenarios 3/4).
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    async fn server_preferred_resources(&self) -> Result<DiscoveredResources, ClientError>;
}

/// Production discovery adapter, built on `kube::discovery::Discovery`
/// exactly as `orka-kubehub::discover` runs it.
pub struct KubeDiscoveryClient {
    client: Client,
}

impl KubeDiscoveryClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DiscoveryClient for KubeDiscoveryClient {
    async fn server_preferred_resources(&self) -> Result<DiscoveredResources, ClientError> {
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(|e| ClientError::Discovery(e.to_string()))?;

        let mut groups: HashMap<GroupVersion, HashSet<String>> = HashMap::new();
        for group in discovery.groups() {
            for (ar, _caps) in group.recommended_resources() {
                groups
                    .entry(GroupVersion::new(ar.group.clone(), ar.version.clone()))
                    .or_default()
                    .insert(ar.plural.clone());
            }
        }
        Ok(DiscoveredResources { groups })
    }
}

#[cfg(feature = "mocks")]
pub mod mock {
    use super::*;

    /// A fixed-response discovery double (spec.md §9 "Client injection").
    pub struct MockDiscoveryClient {
        pub resources: DiscoveredResources,
        pub fail: Option<String>,
    }

    impl MockDiscoveryClient {
        pub fn new(resources: DiscoveredResources) -> Self {
            Self { resources, fail: None }
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self { resources: DiscoveredResources::default(), fail: Some(message.into()) }
        }
    }

    #[async_trait]
    impl DiscoveryClient for MockDiscoveryClient {
        async fn server_preferred_resources(&self) -> Result<DiscoveredResources, ClientError> {
            match &self.fail {
                Some(msg) => Err(ClientError::Discovery(msg.clone())),
                None => Ok(self.resources.clone()),
            }
        }
    }
}
