//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check baseline times, sizes, rates and ports with the annotation parsers
//! - Check the configured log level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControllerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::annotations::parsers::{
    parse_lb_method, parse_lb_method_for_plus, parse_request_rate, parse_size, parse_time,
    ParseResult,
};
use crate::config::schema::{ConfigParams, ControllerConfig, FeatureFlags};

/// A baseline field that would not survive its own annotation parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a whole controller configuration.
pub fn validate_config(config: &ControllerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = match validate_baseline(&config.baseline, &config.features) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError {
            field: "observability.log_level",
            message: format!(
                "{:?} is not one of: {}",
                config.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate baseline values. Empty optional fields are accepted.
pub fn validate_baseline(
    params: &ConfigParams,
    features: &FeatureFlags,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut check = |field: &'static str, result: ParseResult<String>| {
        if let Err(err) = result {
            errors.push(ValidationError { field, message: err.to_string() });
        }
    };

    let lb_method = if features.is_plus { parse_lb_method_for_plus } else { parse_lb_method };
    if !params.lb_method.is_empty() {
        check("lb_method", lb_method(&params.lb_method));
    }

    check("proxy_connect_timeout", parse_time(&params.proxy_connect_timeout));
    check("proxy_read_timeout", parse_time(&params.proxy_read_timeout));
    check("proxy_send_timeout", parse_time(&params.proxy_send_timeout));
    check("fail_timeout", parse_time(&params.fail_timeout));
    check("client_max_body_size", parse_size(&params.client_max_body_size));
    check("upstream_zone_size", parse_size(&params.upstream_zone_size));
    check("limit_req_zone_size", parse_size(&params.limit_req_zone_size));

    let optional: [(&'static str, &String, fn(&str) -> ParseResult<String>); 4] = [
        ("slow_start", &params.slow_start, parse_time),
        ("proxy_buffer_size", &params.proxy_buffer_size, parse_size),
        ("proxy_max_temp_file_size", &params.proxy_max_temp_file_size, parse_size),
        ("limit_req_rate", &params.limit_req_rate, parse_request_rate),
    ];
    for (field, value, parse) in optional {
        if !value.is_empty() {
            check(field, parse(value));
        }
    }

    for (field, ports) in [("ports", &params.ports), ("ssl_ports", &params.ssl_ports)] {
        if ports.contains(&0) {
            errors.push(ValidationError {
                field,
                message: "port 0 is outside 1..=65535".to_string(),
            });
        }
    }

    if params.hsts_max_age < 0 {
        errors.push(ValidationError {
            field: "hsts_max_age",
            message: format!("{} is negative", params.hsts_max_age),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
