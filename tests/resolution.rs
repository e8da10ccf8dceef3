//! End-to-end resolution of standalone resources.

use proptest::prelude::*;

use ingress_annotations::annotations::{keys, resolve, resolve_resource, ErrorKind};
use ingress_annotations::config::{Capability, ConfigParams};

mod common;

use common::{annotations, everything, oss, plus, resource};

#[test]
fn test_empty_annotations_yield_baseline() {
    let baseline = ConfigParams::default();
    let resolution = resolve(&baseline, &annotations(&[]), &everything());

    assert_eq!(resolution.config, baseline);
    assert!(resolution.is_clean());
}

#[test]
fn test_bad_value_keeps_baseline_and_siblings_apply() {
    let baseline = ConfigParams::default();
    let input = annotations(&[
        (keys::PROXY_READ_TIMEOUT, "30s"),
        (keys::PROXY_CONNECT_TIMEOUT, "notanumber"),
    ]);

    let resolution = resolve(&baseline, &input, &oss());

    assert_eq!(resolution.config.proxy_read_timeout, "30s");
    assert_eq!(resolution.config.proxy_connect_timeout, baseline.proxy_connect_timeout);
    assert_eq!(resolution.errors.len(), 1);
    assert_eq!(resolution.errors[0].key, keys::PROXY_CONNECT_TIMEOUT);
    assert_eq!(resolution.errors[0].value, "notanumber");
    assert_eq!(resolution.errors[0].kind(), ErrorKind::Parse);
}

#[test]
fn test_every_failure_is_reported() {
    let input = annotations(&[
        (keys::MAX_FAILS, "many"),
        (keys::KEEPALIVE, "lots"),
        (keys::LISTEN_PORTS, "80,70000"),
        (keys::REDIRECT_TO_HTTPS, "yes please"),
        (keys::CLIENT_MAX_BODY_SIZE, "4m"),
    ]);

    let resolution = resolve(&ConfigParams::default(), &input, &oss());

    let mut failed: Vec<_> = resolution.errors.iter().map(|e| e.key.as_str()).collect();
    failed.sort_unstable();
    assert_eq!(
        failed,
        vec![keys::KEEPALIVE, keys::LISTEN_PORTS, keys::MAX_FAILS, keys::REDIRECT_TO_HTTPS]
    );
    assert_eq!(resolution.config.client_max_body_size, "4m");
    assert_eq!(resolution.config.ports, vec![80]);
}

#[test]
fn test_port_out_of_range_is_validation() {
    let input = annotations(&[(keys::LISTEN_PORTS_SSL, "0")]);
    let resolution = resolve(&ConfigParams::default(), &input, &oss());

    assert_eq!(resolution.errors[0].kind(), ErrorKind::Validation);
    assert_eq!(resolution.config.ssl_ports, vec![443]);
}

#[test]
fn test_hsts_group_is_atomic() {
    let baseline = ConfigParams::default();
    let input = annotations(&[
        (keys::HSTS, "true"),
        (keys::HSTS_MAX_AGE, "forever"),
        (keys::HSTS_INCLUDE_SUBDOMAINS, "true"),
    ]);

    let resolution = resolve(&baseline, &input, &oss());

    assert!(!resolution.config.hsts);
    assert!(!resolution.config.hsts_include_subdomains);
    assert_eq!(resolution.config.hsts_max_age, baseline.hsts_max_age);

    let kinds: Vec<_> = resolution.errors.iter().map(|e| (e.key.as_str(), e.kind())).collect();
    assert_eq!(
        kinds,
        vec![(keys::HSTS_MAX_AGE, ErrorKind::Parse), (keys::HSTS, ErrorKind::GroupDiscarded)]
    );
}

#[test]
fn test_valid_hsts_group_commits() {
    let input = annotations(&[
        (keys::HSTS, "true"),
        (keys::HSTS_MAX_AGE, "31536000"),
        (keys::HSTS_BEHIND_PROXY, "true"),
    ]);

    let resolution = resolve(&ConfigParams::default(), &input, &oss());

    assert!(resolution.is_clean());
    assert!(resolution.config.hsts);
    assert!(resolution.config.hsts_behind_proxy);
    assert_eq!(resolution.config.hsts_max_age, 31_536_000);
}

#[test]
fn test_hsts_keys_need_hsts_annotation() {
    let baseline = ConfigParams::default();
    let input = annotations(&[
        (keys::HSTS_MAX_AGE, "100"),
        (keys::HSTS_BEHIND_PROXY, "true"),
    ]);

    let resolution = resolve(&baseline, &input, &oss());

    assert_eq!(resolution.config, baseline);
    assert!(resolution.is_clean());

    let input = annotations(&[
        (keys::HSTS_MAX_AGE, "100"),
        (keys::HSTS_INCLUDE_SUBDOMAINS, "maybe"),
    ]);
    let resolution = resolve(&baseline, &input, &oss());
    assert!(resolution.errors.iter().all(|e| e.key != keys::HSTS));
}

#[test]
fn test_zero_rate_discards_rate_limit_group() {
    let baseline = ConfigParams::default();
    let input = annotations(&[
        (keys::LIMIT_REQ_RATE, "0r/s"),
        (keys::LIMIT_REQ_BURST, "20"),
        (keys::PROXY_READ_TIMEOUT, "5s"),
    ]);

    let resolution = resolve(&baseline, &input, &oss());

    assert_eq!(resolution.config.limit_req_rate, baseline.limit_req_rate);
    assert_eq!(resolution.config.limit_req_burst, baseline.limit_req_burst);
    assert_eq!(resolution.config.proxy_read_timeout, "5s");
    assert_eq!(resolution.errors[0].kind(), ErrorKind::Validation);
}

#[test]
fn test_gated_key_warns_and_is_ignored() {
    let baseline = ConfigParams::default();
    let input = annotations(&[(keys::SLOW_START, "10s"), (keys::PROXY_READ_TIMEOUT, "5s")]);

    let resolution = resolve(&baseline, &input, &oss());

    assert!(resolution.errors.is_empty());
    assert_eq!(resolution.warnings.len(), 1);
    assert_eq!(resolution.warnings[0].key, keys::SLOW_START);
    assert_eq!(resolution.warnings[0].capability, Capability::Plus);
    assert_eq!(resolution.config.slow_start, baseline.slow_start);

    let resolution = resolve(&baseline, &input, &plus());
    assert!(resolution.is_clean());
    assert_eq!(resolution.config.slow_start, "10s");
}

#[test]
fn test_invalid_gated_key_is_an_error() {
    let input = annotations(&[(keys::SLOW_START, "soon")]);
    let resolution = resolve(&ConfigParams::default(), &input, &oss());

    assert_eq!(resolution.errors.len(), 1);
    assert!(resolution.warnings.is_empty());
}

#[test]
fn test_health_check_prerequisites() {
    let input = annotations(&[
        (keys::HEALTH_CHECKS, "true"),
        (keys::HEALTH_CHECKS_MANDATORY, "true"),
        (keys::HEALTH_CHECKS_MANDATORY_QUEUE, "10"),
    ]);

    let resolution = resolve(&ConfigParams::default(), &input, &plus());
    assert!(resolution.config.health_check_enabled);
    assert!(resolution.config.health_check_mandatory);
    assert_eq!(resolution.config.health_check_mandatory_queue, 10);

    let mut disabled = input.clone();
    disabled.insert(keys::HEALTH_CHECKS.into(), "false".into());
    let resolution = resolve(&ConfigParams::default(), &disabled, &plus());
    assert!(!resolution.config.health_check_mandatory);
    assert_eq!(resolution.config.health_check_mandatory_queue, 0);
    assert!(resolution.errors.is_empty());
}

#[test]
fn test_resource_reports_unrecognized_and_services() {
    let tea = resource(
        "tea",
        "cafe.example.com",
        &[
            ("nginx.org/proxy-read-timout", "5s"),
            ("example.com/owner", "team-a"),
            (keys::WEBSOCKET_SERVICES, "tea-svc,coffee-svc"),
        ],
    );

    let resolved = resolve_resource(&ConfigParams::default(), &tea, &oss());

    assert_eq!(resolved.unrecognized_keys, vec!["nginx.org/proxy-read-timout".to_string()]);
    assert!(resolved.services.websocket.contains("coffee-svc"));
    assert!(resolved.resolution.is_clean());
}

#[test]
fn test_resolution_serializes_with_error_kind() {
    let tea = resource("tea", "cafe.example.com", &[(keys::MAX_FAILS, "many")]);
    let resolved = resolve_resource(&ConfigParams::default(), &tea, &oss());

    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["identity"]["name"], "tea");
    assert_eq!(json["role"], "standalone");
    assert_eq!(json["errors"][0]["key"], keys::MAX_FAILS);
    assert_eq!(json["errors"][0]["kind"], "parse");
    assert_eq!(json["config"]["max_fails"], 1);
}

const INDEPENDENT: [&str; 4] = [
    keys::PROXY_READ_TIMEOUT,
    keys::MAX_FAILS,
    keys::KEEPALIVE,
    keys::REDIRECT_TO_HTTPS,
];

fn valid_inputs() -> impl Strategy<Value = [String; 4]> {
    (1u32..600, 0i32..100, 0i32..1000, any::<bool>())
        .prop_map(|(secs, fails, keepalive, redirect)| {
            [format!("{secs}s"), fails.to_string(), keepalive.to_string(), redirect.to_string()]
        })
}

proptest! {
    #[test]
    fn resolution_is_deterministic(values in valid_inputs()) {
        let input = INDEPENDENT
            .iter()
            .zip(values.iter())
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        let first = resolve(&ConfigParams::default(), &input, &oss());
        let second = resolve(&ConfigParams::default(), &input, &oss());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn invalid_value_only_affects_its_own_key(
        values in valid_inputs(),
        broken in 0usize..4,
        garbage in "x[a-z]{0,6}",
    ) {
        let mut input: ingress_annotations::annotations::Annotations = INDEPENDENT
            .iter()
            .zip(values.iter())
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        let mut without = input.clone();
        without.remove(INDEPENDENT[broken]);
        input.insert(INDEPENDENT[broken].to_string(), garbage);

        let with_garbage = resolve(&ConfigParams::default(), &input, &oss());
        let clean = resolve(&ConfigParams::default(), &without, &oss());

        prop_assert_eq!(&with_garbage.config, &clean.config);
        prop_assert_eq!(with_garbage.errors.len(), 1);
        prop_assert_eq!(with_garbage.errors[0].key.as_str(), INDEPENDENT[broken]);
    }
}
