//! Primitive value parsers.
//!
//! Each parser is a pure function from the raw annotation text to a typed
//! value. Times and sizes are validated and returned in their trimmed textual
//! form, which is what the renderer emits.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::config::schema::ProxySetHeader;

/// Failure to coerce a raw annotation value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected a boolean, got {0:?}")]
    Bool(String),

    #[error("expected an integer, got {0:?}")]
    Int(String),

    #[error("invalid time string {0:?}")]
    Time(String),

    #[error("invalid size {0:?}: expected a number with an optional k, m or g suffix")]
    Size(String),

    #[error("rate {0:?} does not match <number>r/s or <number>r/m")]
    Rate(String),

    #[error("rate must be greater than zero")]
    ZeroRate,

    #[error("invalid port {0:?}")]
    Port(String),

    #[error("port {0} is outside 1..=65535")]
    PortRange(i64),

    #[error("invalid header {0:?}")]
    Header(String),

    #[error("invalid load balancing method {0:?}")]
    LbMethod(String),

    #[error("{value:?} is not one of: {}", allowed.join(", "))]
    NotAllowed {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("invalid rewrite {0:?}: expected serviceName=<service> rewrite=<path>")]
    Rewrite(String),

    #[error("invalid sticky cookie service {0:?}: expected serviceName=<svc> <cookie> [params]")]
    StickyService(String),
}

impl ParseError {
    /// Whether the value was well formed but violated a domain constraint.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ParseError::ZeroRate
                | ParseError::PortRange(_)
                | ParseError::LbMethod(_)
                | ParseError::NotAllowed { .. }
        )
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

const TIME_UNITS: &[&str] = &["ms", "s", "m", "h", "d", "w", "M", "y"];

/// Parses `1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts.
pub fn parse_bool(raw: &str) -> ParseResult<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseError::Bool(raw.to_string())),
    }
}

pub fn parse_int(raw: &str) -> ParseResult<i32> {
    raw.parse().map_err(|_| ParseError::Int(raw.to_string()))
}

pub fn parse_int64(raw: &str) -> ParseResult<i64> {
    raw.parse().map_err(|_| ParseError::Int(raw.to_string()))
}

/// Parses an nginx time value such as `30s`, `1m30s`, `1h 30m` or `500ms`.
/// A bare number (seconds) is accepted only on its own.
pub fn parse_time(raw: &str) -> ParseResult<String> {
    let value = raw.trim();
    let invalid = || ParseError::Time(raw.to_string());

    if value.is_empty() {
        return Err(invalid());
    }
    if value.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(value.to_string());
    }

    let mut rest = value;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(invalid());
        }
        rest = &rest[digits..];

        // "ms" must be tried before "m"
        let unit = TIME_UNITS
            .iter()
            .filter(|unit| rest.starts_with(*unit))
            .max_by_key(|unit| unit.len())
            .ok_or_else(invalid)?;
        rest = rest[unit.len()..].trim_start();
    }

    Ok(value.to_string())
}

/// Parses an nginx size such as `512`, `10k` or `1m`.
pub fn parse_size(raw: &str) -> ParseResult<String> {
    let value = raw.trim();
    let number = value.strip_suffix(['k', 'K', 'm', 'M', 'g', 'G']).unwrap_or(value);

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Size(raw.to_string()));
    }
    Ok(value.to_string())
}

/// Parses a request rate such as `10r/s` or `300r/m`.
pub fn parse_request_rate(raw: &str) -> ParseResult<String> {
    let value = raw.trim();
    let number = value
        .strip_suffix("r/s")
        .or_else(|| value.strip_suffix("r/m"))
        .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| ParseError::Rate(raw.to_string()))?;

    match number.parse::<u64>() {
        Ok(0) => Err(ParseError::ZeroRate),
        Ok(_) => Ok(value.to_string()),
        Err(_) => Err(ParseError::Rate(raw.to_string())),
    }
}

/// Parses a comma separated list of ports.
pub fn parse_port_list(raw: &str) -> ParseResult<Vec<u16>> {
    raw.split(',')
        .map(|part| {
            let part = part.trim();
            let port: i64 = part.parse().map_err(|_| ParseError::Port(part.to_string()))?;
            u16::try_from(port)
                .ok()
                .filter(|p| *p > 0)
                .ok_or(ParseError::PortRange(port))
        })
        .collect()
}

/// Splits a delimited list, trimming entries and dropping empty ones.
pub fn parse_string_list(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits snippets on newlines, keeping each line verbatim.
pub fn parse_snippets(raw: &str) -> Vec<String> {
    raw.split('\n').map(str::to_string).collect()
}

/// Parses `Name` or `Name: value` entries. A bare name forwards the client's
/// header of the same name.
pub fn parse_proxy_set_headers(raw: &str) -> ParseResult<Vec<ProxySetHeader>> {
    parse_string_list(raw, ',')
        .into_iter()
        .map(|entry| {
            let (name, value) = match entry.split_once(':') {
                Some((name, value)) => (name.trim(), Some(value.trim())),
                None => (entry.as_str(), None),
            };
            if !is_header_name(name) {
                return Err(ParseError::Header(entry.clone()));
            }
            let value = match value {
                Some(value) => value.to_string(),
                None => format!("$http_{}", name.to_lowercase().replace('-', "_")),
            };
            Ok(ProxySetHeader { name: name.to_string(), value })
        })
        .collect()
}

fn is_header_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

const LB_METHODS: &[&str] =
    &["least_conn", "ip_hash", "random", "random two", "random two least_conn"];

const PLUS_LB_METHODS: &[&str] = &[
    "least_time header",
    "least_time last_byte",
    "least_time header inflight",
    "least_time last_byte inflight",
    "random two least_time=header",
    "random two least_time=last_byte",
];

/// Parses a load balancing method. `round_robin` is nginx's implicit default
/// and resolves to an empty directive.
pub fn parse_lb_method(raw: &str) -> ParseResult<String> {
    parse_lb_method_with(raw, &[])
}

/// Like [`parse_lb_method`], additionally accepting the commercial methods.
pub fn parse_lb_method_for_plus(raw: &str) -> ParseResult<String> {
    parse_lb_method_with(raw, PLUS_LB_METHODS)
}

fn parse_lb_method_with(raw: &str, extra: &[&str]) -> ParseResult<String> {
    let method = raw.trim();
    if method == "round_robin" {
        return Ok(String::new());
    }
    if LB_METHODS.contains(&method) || extra.contains(&method) || is_hash_method(method) {
        return Ok(method.to_string());
    }
    Err(ParseError::LbMethod(raw.to_string()))
}

fn is_hash_method(method: &str) -> bool {
    let mut words = method.split_whitespace();
    matches!(
        (words.next(), words.next(), words.next(), words.next()),
        (Some("hash"), Some(_), None, None) | (Some("hash"), Some(_), Some("consistent"), None)
    )
}

/// Checks a value against a closed set.
pub fn parse_enum(raw: &str, allowed: &'static [&'static str]) -> ParseResult<&'static str> {
    allowed
        .iter()
        .find(|candidate| **candidate == raw)
        .copied()
        .ok_or_else(|| ParseError::NotAllowed { value: raw.to_string(), allowed })
}

/// Parses a comma separated list of service names.
pub fn parse_service_list(raw: &str) -> BTreeSet<String> {
    parse_string_list(raw, ',').into_iter().collect()
}

fn service_name(field: &str) -> Option<&str> {
    field.strip_prefix("serviceName=").filter(|s| !s.is_empty())
}

/// Parses `serviceName=<svc> rewrite=<path>` entries separated by `;`.
pub fn parse_rewrite_list(raw: &str) -> ParseResult<BTreeMap<String, String>> {
    let mut rewrites = BTreeMap::new();
    for entry in parse_string_list(raw, ';') {
        let invalid = || ParseError::Rewrite(entry.clone());
        let (service, rewrite) = entry.split_once(char::is_whitespace).ok_or_else(invalid)?;
        let service = service_name(service).ok_or_else(invalid)?;
        let path = rewrite
            .trim()
            .strip_prefix("rewrite=")
            .filter(|p| !p.is_empty())
            .ok_or_else(invalid)?;
        rewrites.insert(service.to_string(), path.to_string());
    }
    Ok(rewrites)
}

/// Parses `serviceName=<svc> <cookie> [parameters]` entries separated by `;`.
/// Each service maps to its cookie specification.
pub fn parse_sticky_service_list(raw: &str) -> ParseResult<BTreeMap<String, String>> {
    let mut services = BTreeMap::new();
    for entry in parse_string_list(raw, ';') {
        let invalid = || ParseError::StickyService(entry.clone());
        let (service, cookie) = entry.split_once(char::is_whitespace).ok_or_else(invalid)?;
        let service = service_name(service).ok_or_else(invalid)?;
        let cookie = cookie.trim();
        let cookie_name = cookie.split_whitespace().next().ok_or_else(invalid)?;
        if cookie_name.contains('=') || !is_header_name(cookie_name) {
            return Err(invalid());
        }
        services.insert(service.to_string(), cookie.to_string());
    }
    Ok(services)
}
