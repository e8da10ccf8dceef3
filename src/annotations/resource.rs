//! Resources and their end-to-end resolution.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotations::resolver::{resolve, Resolution};
use crate::annotations::role::{filter_for_role, prepare_minion, ResourceRole};
use crate::annotations::services::{resolve_services, ServiceSettings};
use crate::annotations::{keys, Annotations};
use crate::config::schema::{ConfigParams, FeatureFlags};

/// Namespace and name of a resource, used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A routing resource as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: String,
    /// Host the resource serves. Masters and minions are paired by host.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub annotations: Annotations,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Resource {
    pub fn identity(&self) -> ResourceIdentity {
        ResourceIdentity {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }
}

/// Everything produced for one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceResolution {
    pub identity: ResourceIdentity,
    pub role: ResourceRole,
    /// Keys stripped by the role filter.
    pub removed_keys: Vec<String>,
    /// Controller-owned keys nothing reads.
    pub unrecognized_keys: Vec<String>,
    pub services: ServiceSettings,
    #[serde(flatten)]
    pub resolution: Resolution,
}

/// A master with its minions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeableResolution {
    pub master: ResourceResolution,
    pub minions: Vec<ResourceResolution>,
}

fn finish(
    resource: &Resource,
    role: ResourceRole,
    annotations: &Annotations,
    removed_keys: Vec<String>,
    baseline: &ConfigParams,
    flags: &FeatureFlags,
) -> ResourceResolution {
    let mut resolution = resolve(baseline, annotations, flags);
    let (services, service_errors) = resolve_services(annotations);
    resolution.errors.extend(service_errors);

    ResourceResolution {
        identity: resource.identity(),
        role,
        removed_keys,
        unrecognized_keys: keys::unrecognized_keys(&resource.annotations),
        services,
        resolution,
    }
}

/// Resolves a resource on its own, filtering by its declared role. A minion
/// resolved this way inherits nothing.
pub fn resolve_resource(
    baseline: &ConfigParams,
    resource: &Resource,
    flags: &FeatureFlags,
) -> ResourceResolution {
    let (role, role_error) = match ResourceRole::from_annotations(&resource.annotations) {
        Ok(role) => (role, None),
        Err(err) => (ResourceRole::Standalone, Some(err)),
    };
    let (annotations, removed) = filter_for_role(&resource.annotations, role);

    let mut resolved = finish(resource, role, &annotations, removed, baseline, flags);
    if let Some(err) = role_error {
        resolved.resolution.errors.insert(0, err);
    }
    resolved
}

/// Resolves a master and its minions. Each minion starts from `baseline`, not
/// from the master's resolved configuration.
pub fn resolve_mergeable(
    baseline: &ConfigParams,
    master: &Resource,
    minions: &[Resource],
    flags: &FeatureFlags,
) -> MergeableResolution {
    let (master_annotations, master_removed) =
        filter_for_role(&master.annotations, ResourceRole::Master);

    let minions = minions
        .iter()
        .map(|minion| {
            let prepared = prepare_minion(&master_annotations, &minion.annotations);
            finish(
                minion,
                ResourceRole::Minion,
                &prepared.annotations,
                prepared.removed,
                baseline,
                flags,
            )
        })
        .collect();

    MergeableResolution {
        master: finish(
            master,
            ResourceRole::Master,
            &master_annotations,
            master_removed,
            baseline,
            flags,
        ),
        minions,
    }
}

/// Resources arranged for resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceGroup {
    Standalone(Resource),
    Mergeable { master: Resource, minions: Vec<Resource> },
}

/// Result of [`group_by_host`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    pub groups: Vec<ResourceGroup>,
    /// Minions whose host has no master.
    pub orphans: Vec<ResourceIdentity>,
}

/// Pairs every master with the minions that share its host. Resources with
/// an unknown role are treated as standalone. Masters keep their input
/// order; a second master for the same host is resolved on its own.
pub fn group_by_host(resources: Vec<Resource>) -> Grouping {
    let mut grouping = Grouping::default();
    let mut masters: BTreeMap<Option<String>, usize> = BTreeMap::new();
    let mut minions: Vec<Resource> = Vec::new();

    for resource in resources {
        match ResourceRole::from_annotations(&resource.annotations).unwrap_or_default() {
            ResourceRole::Master if !masters.contains_key(&resource.host) => {
                masters.insert(resource.host.clone(), grouping.groups.len());
                grouping.groups.push(ResourceGroup::Mergeable {
                    master: resource,
                    minions: Vec::new(),
                });
            }
            ResourceRole::Minion => minions.push(resource),
            _ => grouping.groups.push(ResourceGroup::Standalone(resource)),
        }
    }

    for minion in minions {
        let group = masters.get(&minion.host).and_then(|index| grouping.groups.get_mut(*index));
        match group {
            Some(ResourceGroup::Mergeable { minions, .. }) => minions.push(minion),
            _ => grouping.orphans.push(minion.identity()),
        }
    }

    grouping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str, host: &str, pairs: &[(&str, &str)]) -> Resource {
        Resource {
            namespace: "cafe".into(),
            name: name.into(),
            host: Some(host.into()),
            annotations: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn test_unknown_role_is_reported() {
        let resolved = resolve_resource(
            &ConfigParams::default(),
            &resource(
                "tea",
                "cafe.example.com",
                &[(keys::MERGEABLE_INGRESS_TYPE, "boss"), (keys::HSTS, "true")],
            ),
            &FeatureFlags::default(),
        );

        assert_eq!(resolved.role, ResourceRole::Standalone);
        assert_eq!(resolved.resolution.errors[0].key, keys::MERGEABLE_INGRESS_TYPE);
        assert!(resolved.resolution.config.hsts);
    }

    #[test]
    fn test_group_by_host() {
        let master =
            resource("master", "cafe.example.com", &[(keys::MERGEABLE_INGRESS_TYPE, "master")]);
        let tea = resource("tea", "cafe.example.com", &[(keys::MERGEABLE_INGRESS_TYPE, "minion")]);
        let stray =
            resource("stray", "other.example.com", &[(keys::MERGEABLE_INGRESS_TYPE, "minion")]);
        let plain = resource("plain", "plain.example.com", &[]);

        let grouping =
            group_by_host(vec![tea.clone(), master.clone(), stray.clone(), plain.clone()]);

        assert_eq!(
            grouping.groups,
            vec![
                ResourceGroup::Mergeable { master, minions: vec![tea] },
                ResourceGroup::Standalone(plain),
            ]
        );
        assert_eq!(grouping.orphans, vec![stray.identity()]);
    }

    #[test]
    fn test_identity_display() {
        let identity = resource("tea", "cafe.example.com", &[]).identity();
        assert_eq!(identity.to_string(), "cafe/tea");
    }
}
