//! Per-key resolution table.
//!
//! Each row names an annotation, how to coerce it, the capability it is gated
//! on and the field that must already be enabled for it to be consulted.
//! Rows are evaluated in order, so a prerequisite row must come before the
//! rows that depend on it.

use crate::annotations::keys;
use crate::annotations::parsers::{
    parse_bool, parse_enum, parse_int, parse_int64, parse_lb_method, parse_lb_method_for_plus,
    parse_port_list, parse_proxy_set_headers, parse_size, parse_snippets, parse_string_list,
    parse_time, ParseError,
};
use crate::annotations::update::FieldUpdate;
use crate::config::schema::{Capability, ConfigParams, FeatureFlags, PathRegex, Switch};

pub(crate) type ParseFn = fn(&str, &FeatureFlags) -> Result<FieldUpdate, ParseError>;

/// A boolean field that gates other rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    HealthChecks,
    MandatoryHealthChecks,
}

impl Prerequisite {
    pub fn is_met(&self, params: &ConfigParams) -> bool {
        match self {
            Prerequisite::HealthChecks => params.health_check_enabled,
            Prerequisite::MandatoryHealthChecks => params.health_check_mandatory,
        }
    }

    /// The annotation that can switch the prerequisite on.
    pub fn key(&self) -> &'static str {
        match self {
            Prerequisite::HealthChecks => keys::HEALTH_CHECKS,
            Prerequisite::MandatoryHealthChecks => keys::HEALTH_CHECKS_MANDATORY,
        }
    }
}

pub(crate) struct Rule {
    pub key: &'static str,
    pub gate: Option<Capability>,
    pub requires: Option<Prerequisite>,
    pub parse: ParseFn,
}

impl Rule {
    const fn new(key: &'static str, parse: ParseFn) -> Self {
        Self {
            key,
            gate: None,
            requires: None,
            parse,
        }
    }

    const fn gated(mut self, capability: Capability) -> Self {
        self.gate = Some(capability);
        self
    }

    const fn requires(mut self, prerequisite: Prerequisite) -> Self {
        self.requires = Some(prerequisite);
        self
    }
}

fn server_tokens(raw: &str, flags: &FeatureFlags) -> Result<FieldUpdate, ParseError> {
    match parse_bool(raw) {
        Ok(true) => Ok(FieldUpdate::ServerTokens("on".to_string())),
        Ok(false) => Ok(FieldUpdate::ServerTokens("off".to_string())),
        // Plus accepts a custom token string in place of on/off.
        Err(_) if flags.is_plus => Ok(FieldUpdate::ServerTokens(raw.to_string())),
        Err(err) => Err(err),
    }
}

fn lb_method(raw: &str, flags: &FeatureFlags) -> Result<FieldUpdate, ParseError> {
    let parse = if flags.is_plus { parse_lb_method_for_plus } else { parse_lb_method };
    Ok(FieldUpdate::LbMethod(parse(raw)?))
}

fn path_regex(raw: &str, _: &FeatureFlags) -> Result<FieldUpdate, ParseError> {
    let mode = match parse_enum(raw, keys::PATH_REGEX_MODES)? {
        "case_sensitive" => PathRegex::CaseSensitive,
        "case_insensitive" => PathRegex::CaseInsensitive,
        _ => PathRegex::Exact,
    };
    Ok(FieldUpdate::PathRegex(Some(mode)))
}

pub(crate) static RULES: &[Rule] = &[
    Rule::new(keys::LB_METHOD, lb_method),
    Rule::new(keys::HEALTH_CHECKS, |raw, _| {
        Ok(FieldUpdate::HealthCheckEnabled(parse_bool(raw)?))
    })
    .gated(Capability::Plus),
    Rule::new(keys::HEALTH_CHECKS_MANDATORY, |raw, _| {
        Ok(FieldUpdate::HealthCheckMandatory(parse_bool(raw)?))
    })
    .requires(Prerequisite::HealthChecks),
    Rule::new(keys::HEALTH_CHECKS_MANDATORY_QUEUE, |raw, _| {
        Ok(FieldUpdate::HealthCheckMandatoryQueue(parse_int64(raw)?))
    })
    .requires(Prerequisite::MandatoryHealthChecks),
    Rule::new(keys::SLOW_START, |raw, _| Ok(FieldUpdate::SlowStart(parse_time(raw)?)))
        .gated(Capability::Plus),
    Rule::new(keys::SERVER_TOKENS, server_tokens),
    Rule::new(keys::SERVER_SNIPPETS, |raw, _| {
        Ok(FieldUpdate::ServerSnippets(parse_snippets(raw)))
    }),
    Rule::new(keys::LOCATION_SNIPPETS, |raw, _| {
        Ok(FieldUpdate::LocationSnippets(parse_snippets(raw)))
    }),
    Rule::new(keys::PROXY_CONNECT_TIMEOUT, |raw, _| {
        Ok(FieldUpdate::ProxyConnectTimeout(parse_time(raw)?))
    }),
    Rule::new(keys::PROXY_READ_TIMEOUT, |raw, _| {
        Ok(FieldUpdate::ProxyReadTimeout(parse_time(raw)?))
    }),
    Rule::new(keys::PROXY_SEND_TIMEOUT, |raw, _| {
        Ok(FieldUpdate::ProxySendTimeout(parse_time(raw)?))
    }),
    Rule::new(keys::PROXY_HIDE_HEADERS, |raw, _| {
        Ok(FieldUpdate::ProxyHideHeaders(parse_string_list(raw, ',')))
    }),
    Rule::new(keys::PROXY_PASS_HEADERS, |raw, _| {
        Ok(FieldUpdate::ProxyPassHeaders(parse_string_list(raw, ',')))
    }),
    Rule::new(keys::PROXY_SET_HEADERS, |raw, _| {
        Ok(FieldUpdate::ProxySetHeaders(parse_proxy_set_headers(raw)?))
    }),
    Rule::new(keys::CLIENT_MAX_BODY_SIZE, |raw, _| {
        Ok(FieldUpdate::ClientMaxBodySize(parse_size(raw)?))
    }),
    Rule::new(keys::REDIRECT_TO_HTTPS, |raw, _| {
        Ok(FieldUpdate::RedirectToHttps(parse_bool(raw)?))
    }),
    Rule::new(keys::SSL_REDIRECT, |raw, _| Ok(FieldUpdate::SslRedirect(parse_bool(raw)?))),
    Rule::new(keys::PROXY_BUFFERING, |raw, _| {
        Ok(FieldUpdate::ProxyBuffering(parse_bool(raw)?))
    }),
    // "<number> <size>", passed through as written
    Rule::new(keys::PROXY_BUFFERS, |raw, _| Ok(FieldUpdate::ProxyBuffers(raw.to_string()))),
    Rule::new(keys::PROXY_BUFFER_SIZE, |raw, _| {
        Ok(FieldUpdate::ProxyBufferSize(parse_size(raw)?))
    }),
    Rule::new(keys::UPSTREAM_ZONE_SIZE, |raw, _| {
        Ok(FieldUpdate::UpstreamZoneSize(parse_size(raw)?))
    }),
    Rule::new(keys::PROXY_MAX_TEMP_FILE_SIZE, |raw, _| {
        Ok(FieldUpdate::ProxyMaxTempFileSize(parse_size(raw)?))
    }),
    Rule::new(keys::JWT_REALM, |raw, _| Ok(FieldUpdate::JwtRealm(raw.to_string())))
        .gated(Capability::Plus),
    Rule::new(keys::JWT_KEY, |raw, _| Ok(FieldUpdate::JwtKey(raw.to_string())))
        .gated(Capability::Plus),
    Rule::new(keys::JWT_TOKEN, |raw, _| Ok(FieldUpdate::JwtToken(raw.to_string())))
        .gated(Capability::Plus),
    Rule::new(keys::JWT_LOGIN_URL, |raw, _| Ok(FieldUpdate::JwtLoginUrl(raw.to_string())))
        .gated(Capability::Plus),
    Rule::new(keys::BASIC_AUTH_SECRET, |raw, _| {
        Ok(FieldUpdate::BasicAuthSecret(raw.to_string()))
    }),
    Rule::new(keys::BASIC_AUTH_REALM, |raw, _| {
        Ok(FieldUpdate::BasicAuthRealm(raw.to_string()))
    }),
    Rule::new(keys::LISTEN_PORTS, |raw, _| Ok(FieldUpdate::Ports(parse_port_list(raw)?))),
    Rule::new(keys::LISTEN_PORTS_SSL, |raw, _| {
        Ok(FieldUpdate::SslPorts(parse_port_list(raw)?))
    }),
    Rule::new(keys::KEEPALIVE, |raw, _| Ok(FieldUpdate::Keepalive(parse_int(raw)?))),
    Rule::new(keys::MAX_FAILS, |raw, _| Ok(FieldUpdate::MaxFails(parse_int(raw)?))),
    Rule::new(keys::MAX_CONNS, |raw, _| Ok(FieldUpdate::MaxConns(parse_int(raw)?))),
    Rule::new(keys::FAIL_TIMEOUT, |raw, _| Ok(FieldUpdate::FailTimeout(parse_time(raw)?))),
    Rule::new(keys::APP_PROTECT_ENABLE, |raw, _| {
        Ok(FieldUpdate::AppProtectEnable(Some(Switch::from(parse_bool(raw)?))))
    })
    .gated(Capability::AppProtect),
    Rule::new(keys::APP_PROTECT_SECURITY_LOG_ENABLE, |raw, _| {
        Ok(FieldUpdate::AppProtectLogEnable(Some(Switch::from(parse_bool(raw)?))))
    })
    .gated(Capability::AppProtect),
    Rule::new(keys::APP_PROTECT_DOS_RESOURCE, |raw, _| {
        Ok(FieldUpdate::AppProtectDosResource(raw.to_string()))
    })
    .gated(Capability::AppProtectDos),
    Rule::new(keys::INTERNAL_ROUTE, |raw, _| {
        Ok(FieldUpdate::SpiffeServerCerts(parse_bool(raw)?))
    })
    .gated(Capability::InternalRoutes),
    Rule::new(keys::PATH_REGEX, path_regex),
    Rule::new(keys::USE_CLUSTER_IP, |raw, _| Ok(FieldUpdate::UseClusterIp(parse_bool(raw)?))),
];
