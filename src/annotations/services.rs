//! Per-service settings of a resource.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::annotations::error::ResolutionError;
use crate::annotations::keys;
use crate::annotations::parsers::{
    parse_rewrite_list, parse_service_list, parse_sticky_service_list,
};
use crate::annotations::Annotations;

pub(crate) const SERVICE_KEYS: &[&str] = &[
    keys::WEBSOCKET_SERVICES,
    keys::SSL_SERVICES,
    keys::GRPC_SERVICES,
    keys::REWRITES,
    keys::STICKY_COOKIE_SERVICES,
];

/// Services singled out by annotations, keyed by service name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceSettings {
    pub websocket: BTreeSet<String>,
    pub ssl: BTreeSet<String>,
    pub grpc: BTreeSet<String>,
    /// Service name to rewritten path.
    pub rewrites: BTreeMap<String, String>,
    /// Service name to sticky cookie specification.
    pub sticky_cookies: BTreeMap<String, String>,
}

/// Resolves the service annotations. A malformed list leaves its setting
/// empty.
pub fn resolve_services(annotations: &Annotations) -> (ServiceSettings, Vec<ResolutionError>) {
    let mut settings = ServiceSettings::default();
    let mut errors = Vec::new();
    let list = |key: &str| {
        annotations.get(key).map(|raw| parse_service_list(raw)).unwrap_or_default()
    };

    settings.websocket = list(keys::WEBSOCKET_SERVICES);
    settings.ssl = list(keys::SSL_SERVICES);
    settings.grpc = list(keys::GRPC_SERVICES);

    if let Some(raw) = annotations.get(keys::REWRITES) {
        match parse_rewrite_list(raw) {
            Ok(rewrites) => settings.rewrites = rewrites,
            Err(err) => errors.push(ResolutionError::new(keys::REWRITES, raw.as_str(), err)),
        }
    }

    if let Some(raw) = annotations.get(keys::STICKY_COOKIE_SERVICES) {
        match parse_sticky_service_list(raw) {
            Ok(services) => settings.sticky_cookies = services,
            Err(err) => errors.push(ResolutionError::new(
                keys::STICKY_COOKIE_SERVICES,
                raw.as_str(),
                err,
            )),
        }
    }

    (settings, errors)
}
