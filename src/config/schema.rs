//! Configuration schema definitions.
//!
//! This module defines the controller configuration file and the resolved
//! per-resource configuration snapshot (`ConfigParams`).
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration for the controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Edition and add-on capabilities.
    pub features: FeatureFlags,

    /// Global defaults every resource starts from.
    pub baseline: ConfigParams,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl ControllerConfig {
    /// Baseline adjusted for the configured edition when the file leaves
    /// edition-dependent fields at their defaults.
    pub fn effective_baseline(&self) -> ConfigParams {
        let mut baseline = self.baseline.clone();
        if self.features.is_plus
            && baseline.upstream_zone_size == ConfigParams::default().upstream_zone_size
        {
            baseline.upstream_zone_size = ConfigParams::for_edition(true).upstream_zone_size;
        }
        baseline
    }
}

/// Capabilities switched on at controller startup.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureFlags {
    /// Commercial edition capabilities.
    pub is_plus: bool,

    /// App Protect WAF module is installed.
    pub has_app_protect: bool,

    /// App Protect DoS module is installed.
    pub has_app_protect_dos: bool,

    /// Internal routes for the service mesh are enabled.
    pub enable_internal_routes: bool,
}

impl FeatureFlags {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Plus => self.is_plus,
            Capability::AppProtect => self.has_app_protect,
            Capability::AppProtectDos => self.has_app_protect_dos,
            Capability::InternalRoutes => self.enable_internal_routes,
        }
    }
}

/// A feature flag an annotation can be gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Plus,
    AppProtect,
    AppProtectDos,
    InternalRoutes,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Plus => "plus",
            Capability::AppProtect => "app_protect",
            Capability::AppProtectDos => "app_protect_dos",
            Capability::InternalRoutes => "internal_routes",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Plus => "NGINX Plus",
            Capability::AppProtect => "App Protect",
            Capability::AppProtectDos => "App Protect DoS",
            Capability::InternalRoutes => "internal routes",
        };
        f.write_str(name)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Location modifier used for paths of a resource.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PathRegex {
    CaseSensitive,
    CaseInsensitive,
    Exact,
}

/// Severity at which rejected requests are logged.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LimitReqLogLevel {
    Info,
    Notice,
    Warn,
    Error,
}

/// An on/off directive value.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    On,
    Off,
}

impl From<bool> for Switch {
    fn from(enabled: bool) -> Self {
        if enabled { Switch::On } else { Switch::Off }
    }
}

/// A header passed to the upstream.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProxySetHeader {
    pub name: String,
    pub value: String,
}

/// Resolved configuration for one resource.
///
/// Times and sizes are kept in their validated textual form because the
/// renderer emits them verbatim.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConfigParams {
    /// Load balancing method directive.
    pub lb_method: String,

    pub health_check_enabled: bool,
    pub health_check_mandatory: bool,
    pub health_check_mandatory_queue: i64,

    pub slow_start: String,

    /// `on`, `off`, or a custom token string (commercial edition only).
    pub server_tokens: String,

    pub server_snippets: Vec<String>,
    pub location_snippets: Vec<String>,

    pub proxy_connect_timeout: String,
    pub proxy_read_timeout: String,
    pub proxy_send_timeout: String,

    pub proxy_hide_headers: Vec<String>,
    pub proxy_pass_headers: Vec<String>,
    pub proxy_set_headers: Vec<ProxySetHeader>,

    pub client_max_body_size: String,
    pub redirect_to_https: bool,
    pub ssl_redirect: bool,

    pub proxy_buffering: bool,
    pub proxy_buffers: String,
    pub proxy_buffer_size: String,
    pub proxy_max_temp_file_size: String,
    pub upstream_zone_size: String,

    pub hsts: bool,
    pub hsts_max_age: i64,
    pub hsts_include_subdomains: bool,
    pub hsts_behind_proxy: bool,

    pub jwt_realm: String,
    pub jwt_key: String,
    pub jwt_token: String,
    pub jwt_login_url: String,

    pub basic_auth_secret: String,
    pub basic_auth_realm: String,

    /// Plain listen ports.
    pub ports: Vec<u16>,
    /// SSL listen ports.
    pub ssl_ports: Vec<u16>,

    pub keepalive: i32,
    pub max_fails: i32,
    pub max_conns: i32,
    pub fail_timeout: String,

    pub app_protect_enable: Option<Switch>,
    pub app_protect_log_enable: Option<Switch>,
    /// `namespace/name` reference to a DoS protected resource.
    pub app_protect_dos_resource: String,

    /// Present SPIFFE certificates to upstreams (internal route).
    pub spiffe_server_certs: bool,

    pub path_regex: Option<PathRegex>,
    pub use_cluster_ip: bool,

    pub limit_req_rate: String,
    pub limit_req_key: String,
    pub limit_req_zone_size: String,
    pub limit_req_delay: i32,
    pub limit_req_no_delay: bool,
    pub limit_req_burst: i32,
    pub limit_req_dry_run: bool,
    pub limit_req_log_level: LimitReqLogLevel,
    pub limit_req_reject_code: i32,
    pub limit_req_scale: bool,
}

impl ConfigParams {
    /// Defaults for the given edition.
    pub fn for_edition(is_plus: bool) -> Self {
        let mut params = Self::default();
        if is_plus {
            params.upstream_zone_size = "512k".to_string();
        }
        params
    }
}

impl Default for ConfigParams {
    fn default() -> Self {
        Self {
            lb_method: "random two least_conn".to_string(),
            health_check_enabled: false,
            health_check_mandatory: false,
            health_check_mandatory_queue: 0,
            slow_start: String::new(),
            server_tokens: "on".to_string(),
            server_snippets: Vec::new(),
            location_snippets: Vec::new(),
            proxy_connect_timeout: "60s".to_string(),
            proxy_read_timeout: "60s".to_string(),
            proxy_send_timeout: "60s".to_string(),
            proxy_hide_headers: Vec::new(),
            proxy_pass_headers: Vec::new(),
            proxy_set_headers: Vec::new(),
            client_max_body_size: "1m".to_string(),
            redirect_to_https: false,
            ssl_redirect: true,
            proxy_buffering: true,
            proxy_buffers: String::new(),
            proxy_buffer_size: String::new(),
            proxy_max_temp_file_size: String::new(),
            upstream_zone_size: "256k".to_string(),
            hsts: false,
            hsts_max_age: 2_592_000, // 30 days
            hsts_include_subdomains: false,
            hsts_behind_proxy: false,
            jwt_realm: String::new(),
            jwt_key: String::new(),
            jwt_token: String::new(),
            jwt_login_url: String::new(),
            basic_auth_secret: String::new(),
            basic_auth_realm: String::new(),
            ports: vec![80],
            ssl_ports: vec![443],
            keepalive: 0,
            max_fails: 1,
            max_conns: 0,
            fail_timeout: "10s".to_string(),
            app_protect_enable: None,
            app_protect_log_enable: None,
            app_protect_dos_resource: String::new(),
            spiffe_server_certs: false,
            path_regex: None,
            use_cluster_ip: false,
            limit_req_rate: String::new(),
            limit_req_key: "${binary_remote_addr}".to_string(),
            limit_req_zone_size: "10m".to_string(),
            limit_req_delay: 0,
            limit_req_no_delay: false,
            limit_req_burst: 0,
            limit_req_dry_run: false,
            limit_req_log_level: LimitReqLogLevel::Error,
            limit_req_reject_code: 429,
            limit_req_scale: false,
        }
    }
}
