//! Annotation resolver.
//!
//! Walks the rule table, then the compound groups, writing each accepted
//! value into a copy of the baseline. A rejected value leaves its field at
//! the baseline's value; resolution always runs to the end.

use serde::Serialize;

use crate::annotations::compound::GROUPS;
use crate::annotations::error::{CapabilityWarning, ResolutionError};
use crate::annotations::rules::{Rule, RULES};
use crate::annotations::Annotations;
use crate::config::schema::{ConfigParams, FeatureFlags};

/// Best-effort snapshot plus everything that kept an annotation out of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub config: ConfigParams,
    pub errors: Vec<ResolutionError>,
    pub warnings: Vec<CapabilityWarning>,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

enum Outcome {
    Applied,
    Rejected(ResolutionError),
    Gated(CapabilityWarning),
}

impl Rule {
    /// Resolves this row against `params`. `None` when the key is absent or
    /// its prerequisite is off.
    fn resolve(
        &self,
        annotations: &Annotations,
        params: &mut ConfigParams,
        flags: &FeatureFlags,
    ) -> Option<Outcome> {
        let raw = annotations.get(self.key)?;
        if self.requires.is_some_and(|prerequisite| !prerequisite.is_met(params)) {
            return None;
        }

        let update = match (self.parse)(raw, flags) {
            Ok(update) => update,
            Err(err) => {
                let error = ResolutionError::new(self.key, raw.as_str(), err);
                return Some(Outcome::Rejected(error));
            }
        };

        if let Some(capability) = self.gate.filter(|capability| !flags.allows(*capability)) {
            return Some(Outcome::Gated(CapabilityWarning {
                key: self.key.to_string(),
                capability,
            }));
        }

        update.apply_to(params);
        Some(Outcome::Applied)
    }
}

/// Resolves `annotations` on top of `baseline`. The baseline is not modified.
pub fn resolve(
    baseline: &ConfigParams,
    annotations: &Annotations,
    flags: &FeatureFlags,
) -> Resolution {
    let mut config = baseline.clone();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for rule in RULES {
        match rule.resolve(annotations, &mut config, flags) {
            Some(Outcome::Rejected(err)) => errors.push(err),
            Some(Outcome::Gated(warning)) => warnings.push(warning),
            Some(Outcome::Applied) | None => {}
        }
    }

    for group in GROUPS {
        let outcome = group.resolve(annotations);
        errors.extend(outcome.errors);
        for update in outcome.updates {
            update.apply_to(&mut config);
        }
    }

    Resolution { config, errors, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::error::ErrorKind;
    use crate::annotations::keys;
    use crate::config::schema::{Capability, Switch};

    fn annotations(pairs: &[(&str, &str)]) -> Annotations {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn plus() -> FeatureFlags {
        FeatureFlags { is_plus: true, ..Default::default() }
    }

    #[test]
    fn test_empty_annotations_keep_baseline() {
        let baseline = ConfigParams::default();
        let resolution = resolve(&baseline, &Annotations::new(), &FeatureFlags::default());

        assert_eq!(resolution.config, baseline);
        assert!(resolution.is_clean());
    }

    #[test]
    fn test_bad_key_does_not_block_others() {
        let mut baseline = ConfigParams::default();
        baseline.keepalive = 1;
        baseline.max_fails = 2;

        let resolution = resolve(
            &baseline,
            &annotations(&[(keys::KEEPALIVE, "bad"), (keys::MAX_FAILS, "3")]),
            &FeatureFlags::default(),
        );

        assert_eq!(resolution.config.keepalive, 1);
        assert_eq!(resolution.config.max_fails, 3);
        assert_eq!(resolution.errors.len(), 1);
        assert_eq!(resolution.errors[0].key, keys::KEEPALIVE);
    }

    #[test]
    fn test_timeouts() {
        let resolution = resolve(
            &ConfigParams::default(),
            &annotations(&[
                (keys::PROXY_READ_TIMEOUT, "30s"),
                (keys::PROXY_CONNECT_TIMEOUT, "notanumber"),
            ]),
            &FeatureFlags::default(),
        );

        assert_eq!(resolution.config.proxy_read_timeout, "30s");
        assert_eq!(resolution.config.proxy_connect_timeout, "60s");
        assert_eq!(resolution.errors.len(), 1);
        assert_eq!(resolution.errors[0].key, keys::PROXY_CONNECT_TIMEOUT);
        assert_eq!(resolution.errors[0].value, "notanumber");
    }

    #[test]
    fn test_gated_key_warns_without_writing() {
        let input = annotations(&[(keys::SLOW_START, "30s"), (keys::HEALTH_CHECKS, "true")]);
        let baseline = ConfigParams::default();

        let open = resolve(&baseline, &input, &FeatureFlags::default());
        assert_eq!(open.config, baseline);
        assert!(open.errors.is_empty());
        assert_eq!(
            open.warnings,
            vec![
                CapabilityWarning { key: keys::HEALTH_CHECKS.into(), capability: Capability::Plus },
                CapabilityWarning { key: keys::SLOW_START.into(), capability: Capability::Plus },
            ]
        );

        let with_plus = resolve(&baseline, &input, &plus());
        assert!(with_plus.is_clean());
        assert_eq!(with_plus.config.slow_start, "30s");
        assert!(with_plus.config.health_check_enabled);
    }

    #[test]
    fn test_gated_key_with_bad_value_is_an_error() {
        let resolution = resolve(
            &ConfigParams::default(),
            &annotations(&[(keys::SLOW_START, "soon")]),
            &FeatureFlags::default(),
        );

        assert!(resolution.warnings.is_empty());
        assert_eq!(resolution.errors.len(), 1);
    }

    #[test]
    fn test_mandatory_queue_needs_prerequisites() {
        let input = annotations(&[
            (keys::HEALTH_CHECKS, "true"),
            (keys::HEALTH_CHECKS_MANDATORY, "true"),
            (keys::HEALTH_CHECKS_MANDATORY_QUEUE, "10"),
        ]);

        let resolved = resolve(&ConfigParams::default(), &input, &plus());
        assert!(resolved.config.health_check_mandatory);
        assert_eq!(resolved.config.health_check_mandatory_queue, 10);

        // Without Plus the health check switch is gated, so nothing downstream is consulted.
        let gated = resolve(&ConfigParams::default(), &input, &FeatureFlags::default());
        assert!(!gated.config.health_check_mandatory);
        assert_eq!(gated.config.health_check_mandatory_queue, 0);
        assert_eq!(gated.warnings.len(), 1);
    }

    #[test]
    fn test_prerequisite_from_baseline() {
        let mut baseline = ConfigParams::default();
        baseline.health_check_enabled = true;
        baseline.health_check_mandatory = true;

        let resolution = resolve(
            &baseline,
            &annotations(&[(keys::HEALTH_CHECKS_MANDATORY_QUEUE, "5")]),
            &FeatureFlags::default(),
        );
        assert_eq!(resolution.config.health_check_mandatory_queue, 5);
    }

    #[test]
    fn test_enum_outside_set_is_an_error() {
        let mut baseline = ConfigParams::default();
        baseline.path_regex = None;

        let resolution = resolve(
            &baseline,
            &annotations(&[(keys::PATH_REGEX, "fuzzy")]),
            &FeatureFlags::default(),
        );
        assert_eq!(resolution.config.path_regex, None);
        assert_eq!(resolution.errors[0].kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_app_protect_switches() {
        let flags = FeatureFlags { has_app_protect: true, ..Default::default() };
        let resolution = resolve(
            &ConfigParams::default(),
            &annotations(&[
                (keys::APP_PROTECT_ENABLE, "True"),
                (keys::APP_PROTECT_SECURITY_LOG_ENABLE, "false"),
            ]),
            &flags,
        );

        assert_eq!(resolution.config.app_protect_enable, Some(Switch::On));
        assert_eq!(resolution.config.app_protect_log_enable, Some(Switch::Off));
    }

    #[test]
    fn test_hsts_group_is_atomic() {
        let baseline = ConfigParams::default();
        let resolution = resolve(
            &baseline,
            &annotations(&[
                (keys::HSTS, "true"),
                (keys::HSTS_MAX_AGE, "forever"),
                (keys::HSTS_BEHIND_PROXY, "true"),
            ]),
            &FeatureFlags::default(),
        );

        assert!(!resolution.config.hsts);
        assert_eq!(resolution.config.hsts_max_age, baseline.hsts_max_age);
        assert!(!resolution.config.hsts_behind_proxy);
        assert_eq!(resolution.errors.iter().filter(|e| e.key == keys::HSTS_MAX_AGE).count(), 1);
    }

    #[test]
    fn test_baseline_is_untouched() {
        let baseline = ConfigParams::default();
        let before = baseline.clone();
        let input = annotations(&[(keys::MAX_CONNS, "50")]);
        let _ = resolve(&baseline, &input, &FeatureFlags::default());

        assert_eq!(baseline, before);
    }
}
