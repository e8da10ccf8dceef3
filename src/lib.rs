//! Ingress annotation resolution library.
//!
//! Turns the string annotations of a routing resource into a validated
//! [`ConfigParams`] snapshot, honoring master/minion precedence.

pub mod annotations;
pub mod config;
pub mod observability;

pub use annotations::{
    resolve, resolve_mergeable, resolve_resource, Resolution, Resource, ResourceResolution,
};
pub use config::schema::{ConfigParams, ControllerConfig, FeatureFlags};
