use serde::{Deserialize, Serialize};

/// A `(group, version)` pair, e.g. `("", "v1")` for the core group or
/// `("apps", "v1")` for `apps/v1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl GroupVersion {
    pub fn new(group: impl Into<String>, version: impl Into<String>) -> Self {
        Self { group: group.into(), version: version.into() }
    }

    /// `""` for the core group, `"<group>/<version>"` otherwise — the
    /// form Kubernetes discovery reports a `groupVersion` string in.
    pub fn as_discovery_key(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

/// Resolved `(group, version, resource)` triple. Only produced by
/// validation against discovery — `ResourceObservation::gvr` is `None`
/// until then.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: impl Into<String>, version: impl Into<String>, resource: impl Into<String>) -> Self {
        Self { group: group.into(), version: version.into(), resource: resource.into() }
    }

    pub fn group_version(&self) -> GroupVersion {
        GroupVersion::new(self.group.clone(), self.version.clone())
    }
}

impl std::fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.resource)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.resource)
        }
    }
}

/// Observation mode for a `ResourceObservation` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationMode {
    Pull,
    Watch,
}

impl ObservationMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "" => Some(Self::Pull),
            "pull" => Some(Self::Pull),
            "watch" => Some(Self::Watch),
            _ => None,
        }
    }
}

impl Default for ObservationMode {
    fn default() -> Self {
        Self::Pull
    }
}
