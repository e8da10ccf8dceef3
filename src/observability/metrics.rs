//! Metrics collection.
//!
//! # Metrics
//! - `annotation_resolutions_total` (counter): resolutions by role
//! - `annotation_errors_total` (counter): rejected annotations by key, kind
//! - `annotation_capability_warnings_total` (counter): gated annotations by capability
//! - `annotation_keys_removed_total` (counter): denylisted keys stripped, by role
//!
//! # Design Decisions
//! - Counters go to whatever recorder the host installs; without one they are no-ops
//! - Key labels are bounded by the fixed annotation key space

use metrics::counter;

use crate::annotations::ResourceResolution;

pub fn record_resolution(resolved: &ResourceResolution) {
    let role = resolved.role.as_str();
    counter!("annotation_resolutions_total", "role" => role).increment(1);

    for err in &resolved.resolution.errors {
        counter!(
            "annotation_errors_total",
            "key" => err.key.clone(),
            "kind" => err.kind().as_str()
        )
        .increment(1);
    }

    for warning in &resolved.resolution.warnings {
        counter!(
            "annotation_capability_warnings_total",
            "capability" => warning.capability.as_str()
        )
        .increment(1);
    }

    if !resolved.removed_keys.is_empty() {
        counter!("annotation_keys_removed_total", "role" => role)
            .increment(resolved.removed_keys.len() as u64);
    }
}
