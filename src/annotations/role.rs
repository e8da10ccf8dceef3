//! Role filter and master-to-minion merge.
//!
//! # Data Flow
//! ```text
//! master annotations ── strip master denylist ──┐
//!                                               ├─ fill missing inheritable keys ─→ minion set
//! minion annotations ── strip minion denylist ──┘
//! ```
//!
//! Filtering always happens before the merge, so a key denied to the master
//! can never reach a minion through inheritance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::annotations::error::{Cause, ResolutionError};
use crate::annotations::keys;
use crate::annotations::Annotations;

/// Position of a resource in a mergeable set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceRole {
    Master,
    Minion,
    #[default]
    Standalone,
}

impl ResourceRole {
    /// Reads the role from the mergeable type annotation. An unknown value is
    /// reported and the resource is treated as standalone.
    pub fn from_annotations(annotations: &Annotations) -> Result<Self, ResolutionError> {
        match annotations.get(keys::MERGEABLE_INGRESS_TYPE).map(String::as_str) {
            None => Ok(ResourceRole::Standalone),
            Some("master") => Ok(ResourceRole::Master),
            Some("minion") => Ok(ResourceRole::Minion),
            Some(other) => Err(ResolutionError::new(
                keys::MERGEABLE_INGRESS_TYPE,
                other,
                Cause::UnknownRole(other.to_string()),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceRole::Master => "master",
            ResourceRole::Minion => "minion",
            ResourceRole::Standalone => "standalone",
        }
    }

    fn denies(&self, key: &str) -> bool {
        match self {
            ResourceRole::Master => keys::is_master_denied(key),
            ResourceRole::Minion => keys::is_minion_denied(key),
            ResourceRole::Standalone => false,
        }
    }
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copies `annotations` without the keys denied to `role`. Returns the copy
/// and the removed keys in key order.
pub fn filter_for_role(
    annotations: &Annotations,
    role: ResourceRole,
) -> (Annotations, Vec<String>) {
    let (removed, kept): (Annotations, Annotations) = annotations
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .partition(|(key, _)| role.denies(key));

    (kept, removed.into_keys().collect())
}

/// Fills keys missing from `minion` with the master's value when the key is
/// inheritable. Keys the minion already sets are never overwritten.
pub fn merge_inherited(minion: &mut Annotations, master: &Annotations) {
    for (key, value) in master {
        if keys::is_minion_inherited(key) && !minion.contains_key(key) {
            minion.insert(key.clone(), value.clone());
        }
    }
}

/// A minion's annotation set after filtering and inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinionAnnotations {
    pub annotations: Annotations,
    /// Keys stripped from the minion's own annotations.
    pub removed: Vec<String>,
}

/// Filters a minion and merges the already-filtered master into it.
pub fn prepare_minion(filtered_master: &Annotations, minion: &Annotations) -> MinionAnnotations {
    let (mut annotations, removed) = filter_for_role(minion, ResourceRole::Minion);
    merge_inherited(&mut annotations, filtered_master);
    MinionAnnotations { annotations, removed }
}
