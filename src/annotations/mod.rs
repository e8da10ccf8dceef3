//! Annotation resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Resource annotations (string → string)
//!     → role.rs (strip denylisted keys, minions inherit from master)
//!     → resolver.rs
//!         → rules.rs (one row per key: parser, capability gate, prerequisite)
//!         → compound.rs (HSTS and rate limiting, all-or-nothing)
//!     → Resolution { ConfigParams, errors, warnings }
//!     → caller (observability::logging reports, renderer consumes)
//! ```
//!
//! # Design Decisions
//! - Resolution is pure: no logging, no I/O, baseline copied before writes
//! - A bad value never aborts the pass; the field keeps the baseline value
//! - Classification tables are built once and only queried
//! - Capability gates warn instead of erroring

use std::collections::BTreeMap;

pub mod compound;
pub mod error;
pub mod keys;
pub mod parsers;
pub mod resolver;
pub mod resource;
pub mod role;
pub mod rules;
pub mod services;
pub mod update;

/// Annotations of one resource, ordered by key.
pub type Annotations = BTreeMap<String, String>;

pub use error::{CapabilityWarning, Cause, ErrorKind, ResolutionError};
pub use resolver::{resolve, Resolution};
pub use resource::{
    group_by_host, resolve_mergeable, resolve_resource, Grouping, MergeableResolution, Resource,
    ResourceGroup, ResourceIdentity, ResourceResolution,
};
pub use role::{filter_for_role, merge_inherited, prepare_minion, ResourceRole};
pub use services::{resolve_services, ServiceSettings};
