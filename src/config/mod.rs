//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! controller config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (baseline checked with the annotation parsers)
//!     → ControllerConfig (validated, immutable)
//!     → baseline handed to every resolution by reference
//!
//! On change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new config sent to the resolve loop
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A config that fails validation never replaces the current one

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::{Capability, ConfigParams, ControllerConfig, FeatureFlags, ObservabilityConfig};
