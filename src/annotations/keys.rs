//! Annotation key space and classification tables.
//!
//! The tables are built once on first use and are read-only afterwards. They
//! are only reachable through the query functions below.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::annotations::Annotations;

pub const LB_METHOD: &str = "nginx.org/lb-method";
pub const HEALTH_CHECKS: &str = "nginx.com/health-checks";
pub const HEALTH_CHECKS_MANDATORY: &str = "nginx.com/health-checks-mandatory";
pub const HEALTH_CHECKS_MANDATORY_QUEUE: &str = "nginx.com/health-checks-mandatory-queue";
pub const SLOW_START: &str = "nginx.com/slow-start";
pub const SERVER_TOKENS: &str = "nginx.org/server-tokens";
pub const SERVER_SNIPPETS: &str = "nginx.org/server-snippets";
pub const LOCATION_SNIPPETS: &str = "nginx.org/location-snippets";
pub const PROXY_CONNECT_TIMEOUT: &str = "nginx.org/proxy-connect-timeout";
pub const PROXY_READ_TIMEOUT: &str = "nginx.org/proxy-read-timeout";
pub const PROXY_SEND_TIMEOUT: &str = "nginx.org/proxy-send-timeout";
pub const PROXY_HIDE_HEADERS: &str = "nginx.org/proxy-hide-headers";
pub const PROXY_PASS_HEADERS: &str = "nginx.org/proxy-pass-headers";
pub const PROXY_SET_HEADERS: &str = "nginx.org/proxy-set-headers";
pub const CLIENT_MAX_BODY_SIZE: &str = "nginx.org/client-max-body-size";
pub const REDIRECT_TO_HTTPS: &str = "nginx.org/redirect-to-https";
pub const SSL_REDIRECT: &str = "ingress.kubernetes.io/ssl-redirect";
pub const PROXY_BUFFERING: &str = "nginx.org/proxy-buffering";
pub const PROXY_BUFFERS: &str = "nginx.org/proxy-buffers";
pub const PROXY_BUFFER_SIZE: &str = "nginx.org/proxy-buffer-size";
pub const PROXY_MAX_TEMP_FILE_SIZE: &str = "nginx.org/proxy-max-temp-file-size";
pub const UPSTREAM_ZONE_SIZE: &str = "nginx.org/upstream-zone-size";

pub const HSTS: &str = "nginx.org/hsts";
pub const HSTS_MAX_AGE: &str = "nginx.org/hsts-max-age";
pub const HSTS_INCLUDE_SUBDOMAINS: &str = "nginx.org/hsts-include-subdomains";
pub const HSTS_BEHIND_PROXY: &str = "nginx.org/hsts-behind-proxy";

pub const JWT_REALM: &str = "nginx.com/jwt-realm";
pub const JWT_KEY: &str = "nginx.com/jwt-key";
pub const JWT_TOKEN: &str = "nginx.com/jwt-token";
pub const JWT_LOGIN_URL: &str = "nginx.com/jwt-login-url";
pub const BASIC_AUTH_SECRET: &str = "nginx.org/basic-auth-secret";
pub const BASIC_AUTH_REALM: &str = "nginx.org/basic-auth-realm";

pub const LISTEN_PORTS: &str = "nginx.org/listen-ports";
pub const LISTEN_PORTS_SSL: &str = "nginx.org/listen-ports-ssl";
pub const KEEPALIVE: &str = "nginx.org/keepalive";
pub const MAX_FAILS: &str = "nginx.org/max-fails";
pub const MAX_CONNS: &str = "nginx.org/max-conns";
pub const FAIL_TIMEOUT: &str = "nginx.org/fail-timeout";

pub const APP_PROTECT_ENABLE: &str = "appprotect.f5.com/app-protect-enable";
pub const APP_PROTECT_POLICY: &str = "appprotect.f5.com/app-protect-policy";
pub const APP_PROTECT_SECURITY_LOG_ENABLE: &str =
    "appprotect.f5.com/app-protect-security-log-enable";
pub const APP_PROTECT_SECURITY_LOG: &str = "appprotect.f5.com/app-protect-security-log";
pub const APP_PROTECT_SECURITY_LOG_DESTINATION: &str =
    "appprotect.f5.com/app-protect-security-log-destination";
pub const APP_PROTECT_DOS_RESOURCE: &str = "appprotectdos.f5.com/app-protect-dos-resource";
pub const INTERNAL_ROUTE: &str = "nsm.nginx.com/internal-route";

pub const PATH_REGEX: &str = "nginx.org/path-regex";
pub const USE_CLUSTER_IP: &str = "nginx.org/use-cluster-ip";

pub const LIMIT_REQ_RATE: &str = "nginx.org/limit-req-rate";
pub const LIMIT_REQ_KEY: &str = "nginx.org/limit-req-key";
pub const LIMIT_REQ_ZONE_SIZE: &str = "nginx.org/limit-req-zone-size";
pub const LIMIT_REQ_DELAY: &str = "nginx.org/limit-req-delay";
pub const LIMIT_REQ_NO_DELAY: &str = "nginx.org/limit-req-no-delay";
pub const LIMIT_REQ_BURST: &str = "nginx.org/limit-req-burst";
pub const LIMIT_REQ_DRY_RUN: &str = "nginx.org/limit-req-dry-run";
pub const LIMIT_REQ_LOG_LEVEL: &str = "nginx.org/limit-req-log-level";
pub const LIMIT_REQ_REJECT_CODE: &str = "nginx.org/limit-req-reject-code";
pub const LIMIT_REQ_SCALE: &str = "nginx.org/limit-req-scale";

pub const REWRITES: &str = "nginx.org/rewrites";
pub const SSL_SERVICES: &str = "nginx.org/ssl-services";
pub const GRPC_SERVICES: &str = "nginx.org/grpc-services";
pub const WEBSOCKET_SERVICES: &str = "nginx.org/websocket-services";
pub const STICKY_COOKIE_SERVICES: &str = "nginx.com/sticky-cookie-services";

pub const MERGEABLE_INGRESS_TYPE: &str = "nginx.org/mergeable-ingress-type";

pub const PATH_REGEX_MODES: &[&str] = &["case_sensitive", "case_insensitive", "exact"];
pub const LIMIT_REQ_LOG_LEVELS: &[&str] = &["info", "notice", "warn", "error"];

const MASTER_DENYLIST: &[&str] = &[
    REWRITES,
    SSL_SERVICES,
    GRPC_SERVICES,
    WEBSOCKET_SERVICES,
    STICKY_COOKIE_SERVICES,
    HEALTH_CHECKS,
    HEALTH_CHECKS_MANDATORY,
    HEALTH_CHECKS_MANDATORY_QUEUE,
    USE_CLUSTER_IP,
];

const MINION_DENYLIST: &[&str] = &[
    PROXY_HIDE_HEADERS,
    PROXY_PASS_HEADERS,
    REDIRECT_TO_HTTPS,
    SSL_REDIRECT,
    HSTS,
    HSTS_MAX_AGE,
    HSTS_INCLUDE_SUBDOMAINS,
    SERVER_TOKENS,
    LISTEN_PORTS,
    LISTEN_PORTS_SSL,
    SERVER_SNIPPETS,
    APP_PROTECT_ENABLE,
    APP_PROTECT_POLICY,
    APP_PROTECT_SECURITY_LOG_ENABLE,
    APP_PROTECT_SECURITY_LOG,
    APP_PROTECT_DOS_RESOURCE,
];

const MINION_INHERITANCE: &[&str] = &[
    PROXY_CONNECT_TIMEOUT,
    PROXY_READ_TIMEOUT,
    PROXY_SEND_TIMEOUT,
    CLIENT_MAX_BODY_SIZE,
    PROXY_BUFFERING,
    PROXY_BUFFERS,
    PROXY_BUFFER_SIZE,
    PROXY_MAX_TEMP_FILE_SIZE,
    UPSTREAM_ZONE_SIZE,
    LOCATION_SNIPPETS,
    LB_METHOD,
    KEEPALIVE,
    MAX_FAILS,
    MAX_CONNS,
    FAIL_TIMEOUT,
    LIMIT_REQ_RATE,
    LIMIT_REQ_KEY,
    LIMIT_REQ_ZONE_SIZE,
    LIMIT_REQ_DELAY,
    LIMIT_REQ_NO_DELAY,
    LIMIT_REQ_BURST,
    LIMIT_REQ_DRY_RUN,
    LIMIT_REQ_LOG_LEVEL,
    LIMIT_REQ_REJECT_CODE,
    LIMIT_REQ_SCALE,
];

/// Keys read by other parts of the controller rather than by the resolver.
const REFERENCED_KEYS: &[&str] = &[
    MERGEABLE_INGRESS_TYPE,
    APP_PROTECT_POLICY,
    APP_PROTECT_SECURITY_LOG,
    APP_PROTECT_SECURITY_LOG_DESTINATION,
];

/// Domains of keys owned by the controller.
const CONTROLLER_PREFIXES: &[&str] = &["nginx.org", "nginx.com", "f5.com", SSL_REDIRECT];

static MASTER_DENIED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| MASTER_DENYLIST.iter().copied().collect());

static MINION_DENIED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| MINION_DENYLIST.iter().copied().collect());

static MINION_INHERITED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| MINION_INHERITANCE.iter().copied().collect());

static KNOWN: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    crate::annotations::rules::RULES
        .iter()
        .map(|rule| rule.key)
        .chain(crate::annotations::compound::GROUPS.iter().flat_map(|group| group.keys()))
        .chain(crate::annotations::services::SERVICE_KEYS.iter().copied())
        .chain(REFERENCED_KEYS.iter().copied())
        .collect()
});

pub fn is_master_denied(key: &str) -> bool {
    MASTER_DENIED.contains(key)
}

pub fn is_minion_denied(key: &str) -> bool {
    MINION_DENIED.contains(key)
}

pub fn is_minion_inherited(key: &str) -> bool {
    MINION_INHERITED.contains(key)
}

/// Whether any part of the controller reads this key.
pub fn is_known(key: &str) -> bool {
    KNOWN.contains(key)
}

/// Whether the key belongs to a controller-owned domain.
pub fn is_controller_key(key: &str) -> bool {
    CONTROLLER_PREFIXES.iter().any(|domain| key.contains(domain))
}

/// Controller-owned keys that nothing reads, most likely typos.
pub fn unrecognized_keys(annotations: &Annotations) -> Vec<String> {
    annotations
        .keys()
        .filter(|key| is_controller_key(key) && !is_known(key))
        .cloned()
        .collect()
}

/// Snapshot of one table, sorted, for display.
pub fn classification() -> Classification {
    let sorted = |keys: &[&'static str]| {
        let mut keys = keys.to_vec();
        keys.sort_unstable();
        keys
    };
    Classification {
        master_denylist: sorted(MASTER_DENYLIST),
        minion_denylist: sorted(MINION_DENYLIST),
        minion_inheritance: sorted(MINION_INHERITANCE),
    }
}

/// Sorted copies of the classification tables.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Classification {
    pub master_denylist: Vec<&'static str>,
    pub minion_denylist: Vec<&'static str>,
    pub minion_inheritance: Vec<&'static str>,
}
