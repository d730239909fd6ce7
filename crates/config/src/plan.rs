use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use kobs_core::{GroupVersionResource, ObservationMode};

/// The declarative observation plan (spec.md §3/§6): a mapping from
/// `<group>/<version>` (or the reserved alias `v1`) to an ordered
/// sequence of resource observations.
pub type ObservationPlan = HashMap<String, Vec<ResourceObservation>>;

/// One unit of observation, as loaded from YAML — `mode` defaults to
/// pull when absent, and `gvr` is always `None` until `validate` fills
/// it in.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceObservation {
    pub name: String,
    #[serde(default)]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub label_selector: String,
    #[serde(default)]
    pub field_selector: String,
    #[serde(default, deserialize_with = "deserialize_optional_duration")]
    pub interval: Option<Duration>,
    #[serde(skip)]
    pub gvr: Option<GroupVersionResource>,
}

fn deserialize_optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => humantime::parse_duration(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// A fully resolved entry: the same fields as `ResourceObservation`, but
/// with `mode`/`gvr` guaranteed present — the output of `validate`.
#[derive(Debug, Clone)]
pub struct ResolvedObservation {
    pub name: String,
    pub namespaces: Vec<String>,
    pub mode: ObservationMode,
    pub label_selector: String,
    pub field_selector: String,
    pub interval: Option<Duration>,
    pub gvr: GroupVersionResource,
}

/// A validated plan, flattened into a single sequence of resolved
/// entries — exactly the shape `ObjectsReceiver::construct` consumes
/// (spec.md §4.5: "flattens the grouped plan into a single sequence of
/// resolved entries").
#[derive(Debug, Clone, Default)]
pub struct ResolvedPlan {
    pub entries: Vec<ResolvedObservation>,
}
