//! Shared builders for integration tests.

#![allow(dead_code)]

use ingress_annotations::annotations::{keys, Annotations, Resource};
use ingress_annotations::config::FeatureFlags;

/// Build an annotation map from key/value pairs.
pub fn annotations(pairs: &[(&str, &str)]) -> Annotations {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// A resource in the `cafe` namespace serving `host`.
pub fn resource(name: &str, host: &str, pairs: &[(&str, &str)]) -> Resource {
    Resource {
        namespace: "cafe".into(),
        name: name.into(),
        host: Some(host.into()),
        annotations: annotations(pairs),
    }
}

pub fn master(name: &str, host: &str, pairs: &[(&str, &str)]) -> Resource {
    let mut resource = resource(name, host, pairs);
    resource.annotations.insert(keys::MERGEABLE_INGRESS_TYPE.into(), "master".into());
    resource
}

pub fn minion(name: &str, host: &str, pairs: &[(&str, &str)]) -> Resource {
    let mut resource = resource(name, host, pairs);
    resource.annotations.insert(keys::MERGEABLE_INGRESS_TYPE.into(), "minion".into());
    resource
}

pub fn oss() -> FeatureFlags {
    FeatureFlags::default()
}

pub fn plus() -> FeatureFlags {
    FeatureFlags { is_plus: true, ..Default::default() }
}

/// Every capability switched on.
pub fn everything() -> FeatureFlags {
    FeatureFlags {
        is_plus: true,
        has_app_protect: true,
        has_app_protect_dos: true,
        enable_internal_routes: true,
    }
}
