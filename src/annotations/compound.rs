//! Settings spread over several annotations that commit together.
//!
//! Every present member is parsed and every failure is reported. The group's
//! writes are kept only if all present members parsed; otherwise nothing from
//! the group reaches the snapshot. When the enabling key is set, one extra
//! error names the discard.
//!
//! HSTS hangs off `nginx.org/hsts`: without it the other HSTS keys are not
//! read at all. Rate limiting keys stand on their own.

use crate::annotations::error::{Cause, ResolutionError};
use crate::annotations::keys;
use crate::annotations::parsers::{
    parse_bool, parse_enum, parse_int, parse_int64, parse_request_rate, parse_size, ParseError,
};
use crate::annotations::update::FieldUpdate;
use crate::annotations::Annotations;
use crate::config::schema::LimitReqLogLevel;

type MemberFn = fn(&str) -> Result<FieldUpdate, ParseError>;

struct Member {
    key: &'static str,
    parse: MemberFn,
}

/// A group of annotations resolved all-or-nothing.
pub struct CompoundSetting {
    pub name: &'static str,
    /// The member that switches the feature on.
    pub enabling_key: &'static str,
    /// Members are ignored unless the enabling key is present.
    pub requires_enabler: bool,
    members: &'static [Member],
}

/// Outcome of resolving one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupResolution {
    /// Writes to apply; empty when the group was discarded.
    pub updates: Vec<FieldUpdate>,
    pub errors: Vec<ResolutionError>,
}

impl CompoundSetting {
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.members.iter().map(|member| member.key)
    }

    pub fn resolve(&self, annotations: &Annotations) -> GroupResolution {
        let mut outcome = GroupResolution::default();
        let enabling_value = annotations.get(self.enabling_key);
        if self.requires_enabler && enabling_value.is_none() {
            return outcome;
        }

        for member in self.members {
            let Some(raw) = annotations.get(member.key) else {
                continue;
            };
            match (member.parse)(raw) {
                Ok(update) => outcome.updates.push(update),
                Err(err) => {
                    outcome.errors.push(ResolutionError::new(member.key, raw.as_str(), err))
                }
            }
        }

        if outcome.errors.is_empty() {
            return outcome;
        }

        if let Some(enabling_value) = enabling_value.filter(|_| !outcome.updates.is_empty()) {
            let failed = outcome.errors.iter().map(|err| err.key.clone()).collect();
            outcome.errors.push(ResolutionError::new(
                self.enabling_key,
                enabling_value.as_str(),
                Cause::GroupDiscarded { group: self.name, failed },
            ));
        }
        outcome.updates.clear();

        outcome
    }
}

fn limit_req_log_level(raw: &str) -> Result<FieldUpdate, ParseError> {
    let level = match parse_enum(raw, keys::LIMIT_REQ_LOG_LEVELS)? {
        "info" => LimitReqLogLevel::Info,
        "notice" => LimitReqLogLevel::Notice,
        "warn" => LimitReqLogLevel::Warn,
        _ => LimitReqLogLevel::Error,
    };
    Ok(FieldUpdate::LimitReqLogLevel(level))
}

pub static HSTS: CompoundSetting = CompoundSetting {
    name: "hsts",
    enabling_key: keys::HSTS,
    requires_enabler: true,
    members: &[
        Member {
            key: keys::HSTS,
            parse: |raw| Ok(FieldUpdate::Hsts(parse_bool(raw)?)),
        },
        Member {
            key: keys::HSTS_MAX_AGE,
            parse: |raw| Ok(FieldUpdate::HstsMaxAge(parse_int64(raw)?)),
        },
        Member {
            key: keys::HSTS_INCLUDE_SUBDOMAINS,
            parse: |raw| Ok(FieldUpdate::HstsIncludeSubdomains(parse_bool(raw)?)),
        },
        Member {
            key: keys::HSTS_BEHIND_PROXY,
            parse: |raw| Ok(FieldUpdate::HstsBehindProxy(parse_bool(raw)?)),
        },
    ],
};

pub static RATE_LIMIT: CompoundSetting = CompoundSetting {
    name: "rate limit",
    enabling_key: keys::LIMIT_REQ_RATE,
    requires_enabler: false,
    members: &[
        Member {
            key: keys::LIMIT_REQ_RATE,
            parse: |raw| Ok(FieldUpdate::LimitReqRate(parse_request_rate(raw)?)),
        },
        Member {
            key: keys::LIMIT_REQ_KEY,
            parse: |raw| Ok(FieldUpdate::LimitReqKey(raw.to_string())),
        },
        Member {
            key: keys::LIMIT_REQ_ZONE_SIZE,
            parse: |raw| Ok(FieldUpdate::LimitReqZoneSize(parse_size(raw)?)),
        },
        Member {
            key: keys::LIMIT_REQ_DELAY,
            parse: |raw| Ok(FieldUpdate::LimitReqDelay(parse_int(raw)?)),
        },
        Member {
            key: keys::LIMIT_REQ_NO_DELAY,
            parse: |raw| Ok(FieldUpdate::LimitReqNoDelay(parse_bool(raw)?)),
        },
        Member {
            key: keys::LIMIT_REQ_BURST,
            parse: |raw| Ok(FieldUpdate::LimitReqBurst(parse_int(raw)?)),
        },
        Member {
            key: keys::LIMIT_REQ_DRY_RUN,
            parse: |raw| Ok(FieldUpdate::LimitReqDryRun(parse_bool(raw)?)),
        },
        Member {
            key: keys::LIMIT_REQ_LOG_LEVEL,
            parse: limit_req_log_level,
        },
        Member {
            key: keys::LIMIT_REQ_REJECT_CODE,
            parse: |raw| Ok(FieldUpdate::LimitReqRejectCode(parse_int(raw)?)),
        },
        Member {
            key: keys::LIMIT_REQ_SCALE,
            parse: |raw| Ok(FieldUpdate::LimitReqScale(parse_bool(raw)?)),
        },
    ],
};

/// All groups, in resolution order.
pub static GROUPS: &[&CompoundSetting] = &[&HSTS, &RATE_LIMIT];
