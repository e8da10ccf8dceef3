//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Turn resolution results into log events
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::annotations::{ResourceIdentity, ResourceResolution};
use crate::config::schema::{LogFormat, ObservabilityConfig};
use crate::observability::metrics;

/// Install the global subscriber.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Log and count everything a resolution reported.
pub fn report(resolved: &ResourceResolution) {
    let resource = &resolved.identity;

    for key in &resolved.removed_keys {
        tracing::info!(
            resource = %resource,
            role = %resolved.role,
            key = %key,
            "Annotation is not allowed for this role, ignoring"
        );
    }

    for err in &resolved.resolution.errors {
        tracing::error!(
            resource = %resource,
            key = %err.key,
            value = %err.value,
            kind = err.kind().as_str(),
            "{}",
            err.cause
        );
    }

    for warning in &resolved.resolution.warnings {
        tracing::warn!(
            resource = %resource,
            key = %warning.key,
            capability = %warning.capability,
            "Annotation requires a disabled capability, ignoring"
        );
    }

    for key in &resolved.unrecognized_keys {
        tracing::warn!(resource = %resource, key = %key, "Unrecognized annotation");
    }

    tracing::debug!(
        resource = %resource,
        role = %resolved.role,
        errors = resolved.resolution.errors.len(),
        warnings = resolved.resolution.warnings.len(),
        "Annotations resolved"
    );

    metrics::record_resolution(resolved);
}

/// Log minions that were skipped for lack of a master.
pub fn report_orphans(orphans: &[ResourceIdentity]) {
    for resource in orphans {
        tracing::warn!(resource = %resource, "Minion has no master for its host, skipping");
    }
}
