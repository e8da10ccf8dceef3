//! Typed single-field writes into a [`ConfigParams`] snapshot.

use crate::config::schema::{ConfigParams, LimitReqLogLevel, PathRegex, ProxySetHeader, Switch};

macro_rules! field_updates {
    ($($variant:ident($ty:ty) => $field:ident),* $(,)?) => {
        /// A coerced value together with the field it belongs to.
        #[derive(Debug, Clone, PartialEq)]
        pub enum FieldUpdate {
            $($variant($ty)),*
        }

        impl FieldUpdate {
            /// Writes the value into its field.
            pub fn apply_to(self, params: &mut ConfigParams) {
                match self {
                    $(FieldUpdate::$variant(value) => params.$field = value),*
                }
            }

            /// Name of the target field.
            pub fn field(&self) -> &'static str {
                match self {
                    $(FieldUpdate::$variant(_) => stringify!($field)),*
                }
            }
        }
    };
}

field_updates! {
    LbMethod(String) => lb_method,
    HealthCheckEnabled(bool) => health_check_enabled,
    HealthCheckMandatory(bool) => health_check_mandatory,
    HealthCheckMandatoryQueue(i64) => health_check_mandatory_queue,
    SlowStart(String) => slow_start,
    ServerTokens(String) => server_tokens,
    ServerSnippets(Vec<String>) => server_snippets,
    LocationSnippets(Vec<String>) => location_snippets,
    ProxyConnectTimeout(String) => proxy_connect_timeout,
    ProxyReadTimeout(String) => proxy_read_timeout,
    ProxySendTimeout(String) => proxy_send_timeout,
    ProxyHideHeaders(Vec<String>) => proxy_hide_headers,
    ProxyPassHeaders(Vec<String>) => proxy_pass_headers,
    ProxySetHeaders(Vec<ProxySetHeader>) => proxy_set_headers,
    ClientMaxBodySize(String) => client_max_body_size,
    RedirectToHttps(bool) => redirect_to_https,
    SslRedirect(bool) => ssl_redirect,
    ProxyBuffering(bool) => proxy_buffering,
    ProxyBuffers(String) => proxy_buffers,
    ProxyBufferSize(String) => proxy_buffer_size,
    ProxyMaxTempFileSize(String) => proxy_max_temp_file_size,
    UpstreamZoneSize(String) => upstream_zone_size,
    Hsts(bool) => hsts,
    HstsMaxAge(i64) => hsts_max_age,
    HstsIncludeSubdomains(bool) => hsts_include_subdomains,
    HstsBehindProxy(bool) => hsts_behind_proxy,
    JwtRealm(String) => jwt_realm,
    JwtKey(String) => jwt_key,
    JwtToken(String) => jwt_token,
    JwtLoginUrl(String) => jwt_login_url,
    BasicAuthSecret(String) => basic_auth_secret,
    BasicAuthRealm(String) => basic_auth_realm,
    Ports(Vec<u16>) => ports,
    SslPorts(Vec<u16>) => ssl_ports,
    Keepalive(i32) => keepalive,
    MaxFails(i32) => max_fails,
    MaxConns(i32) => max_conns,
    FailTimeout(String) => fail_timeout,
    AppProtectEnable(Option<Switch>) => app_protect_enable,
    AppProtectLogEnable(Option<Switch>) => app_protect_log_enable,
    AppProtectDosResource(String) => app_protect_dos_resource,
    SpiffeServerCerts(bool) => spiffe_server_certs,
    PathRegex(Option<PathRegex>) => path_regex,
    UseClusterIp(bool) => use_cluster_ip,
    LimitReqRate(String) => limit_req_rate,
    LimitReqKey(String) => limit_req_key,
    LimitReqZoneSize(String) => limit_req_zone_size,
    LimitReqDelay(i32) => limit_req_delay,
    LimitReqNoDelay(bool) => limit_req_no_delay,
    LimitReqBurst(i32) => limit_req_burst,
    LimitReqDryRun(bool) => limit_req_dry_run,
    LimitReqLogLevel(LimitReqLogLevel) => limit_req_log_level,
    LimitReqRejectCode(i32) => limit_req_reject_code,
    LimitReqScale(bool) => limit_req_scale,
}
