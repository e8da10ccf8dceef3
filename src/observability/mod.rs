//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ResourceResolution (errors, warnings, removed keys)
//!     → logging.rs (structured log events, one per problem)
//!     → metrics.rs (counters by key, kind, role, capability)
//! ```
//!
//! # Design Decisions
//! - The resolver never logs; this is the only place problems become events
//! - Structured fields (resource, key, kind) for machine parsing
//! - Metrics are cheap (atomic increments); exporting is left to the host

pub mod logging;
pub mod metrics;
