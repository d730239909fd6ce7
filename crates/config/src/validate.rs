use kobs_core::{ConfigError, GroupVersion, GroupVersionResource, ObservationMode};
use kobs_kubehub::DiscoveryClient;

use crate::plan::{ObservationPlan, ResolvedObservation, ResolvedPlan};

/// `Validate` (spec.md §4.3): a pure transformation of the configuration
/// given the cluster's discovered API surface. Returns the first error
/// encountered; on success, every entry carries a resolved `gvr`.
pub async fn validate(
    plan: &ObservationPlan,
    discovery: &dyn DiscoveryClient,
) -> Result<ResolvedPlan, ConfigError> {
    let discovered = discovery
        .server_preferred_resources()
        .await
        .map_err(|e| ConfigError::DiscoveryUnavailable(e.to_string()))?;

    let mut entries = Vec::new();

    for (api_group, observations) in plan {
        let group_version = parse_group_version(api_group)?;
        if !discovered.has_group(&group_version) {
            return Err(ConfigError::UnknownApiGroup(group_version.as_discovery_key()));
        }

        for observation in observations {
            let mode = match &observation.mode {
                None => ObservationMode::Pull,
                Some(raw) => ObservationMode::parse(raw).ok_or_else(|| ConfigError::InvalidMode(raw.clone()))?,
            };

            if !discovered.has_resource(&group_version, &observation.name) {
                return Err(ConfigError::UnknownResource {
                    resource: observation.name.clone(),
                    api_group: api_group.clone(),
                });
            }

            if mode == ObservationMode::Pull {
                match observation.interval {
                    Some(d) if !d.is_zero() => {}
                    _ => return Err(ConfigError::InvalidInterval(observation.name.clone())),
                }
            }

            let gvr = GroupVersionResource::new(
                group_version.group.clone(),
                group_version.version.clone(),
                observation.name.clone(),
            );

            entries.push(ResolvedObservation {
                name: observation.name.clone(),
                namespaces: observation.namespaces.clone(),
                mode,
                label_selector: observation.label_selector.clone(),
                field_selector: observation.field_selector.clone(),
                interval: observation.interval,
                gvr,
            });
        }
    }

    Ok(ResolvedPlan { entries })
}

fn parse_group_version(api_group: &str) -> Result<GroupVersion, ConfigError> {
    if api_group == "v1" {
        return Ok(GroupVersion::new("", "v1"));
    }
    let parts: Vec<&str> = api_group.split('/').collect();
    match parts.as_slice() {
        [group, version] if !group.is_empty() && !version.is_empty() => {
            Ok(GroupVersion::new(*group, *version))
        }
        _ => Err(ConfigError::InvalidGroupVersion(api_group.to_string())),
    }
}
