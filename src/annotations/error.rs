//! Problems reported by a resolution pass.
//!
//! None of these abort a pass. The caller decides what is fatal.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::annotations::parsers::ParseError;
use crate::config::schema::Capability;

/// Why an annotation did not reach the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Cause {
    #[error(transparent)]
    Value(#[from] ParseError),

    #[error("{group} settings discarded because {} failed", failed.join(", "))]
    GroupDiscarded {
        group: &'static str,
        failed: Vec<String>,
    },

    #[error("unknown mergeable type {0:?}, expected master or minion")]
    UnknownRole(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The raw value could not be coerced to its type.
    Parse,
    /// The value parsed but violated a domain constraint.
    Validation,
    /// A compound setting was dropped because a sibling key failed.
    GroupDiscarded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Validation => "validation",
            ErrorKind::GroupDiscarded => "group_discarded",
        }
    }
}

/// An annotation whose value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for {key}: got {value:?}: {cause}")]
pub struct ResolutionError {
    pub key: String,
    pub value: String,
    #[source]
    pub cause: Cause,
}

impl ResolutionError {
    pub fn new(key: impl Into<String>, value: impl Into<String>, cause: impl Into<Cause>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            cause: cause.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.cause {
            Cause::Value(err) if err.is_validation() => ErrorKind::Validation,
            Cause::Value(_) => ErrorKind::Parse,
            Cause::UnknownRole(_) => ErrorKind::Validation,
            Cause::GroupDiscarded { .. } => ErrorKind::GroupDiscarded,
        }
    }
}

/// A valid annotation ignored because its capability is switched off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityWarning {
    pub key: String,
    pub capability: Capability,
}

impl fmt::Display for CapabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "annotation {} requires {}", self.key, self.capability)
    }
}

impl Serialize for ResolutionError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ResolutionError", 4)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("cause", &self.cause.to_string())?;
        state.end()
    }
}
