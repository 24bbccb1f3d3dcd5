//! Undeclared-variable resolution for rendered check documents
//!
//! Alarm criteria and check-wide detail expressions come out of partial
//! rendering still carrying `{{ name }}` template text. Each such fragment
//! is re-parsed and its free variable names are resolved to their declared
//! defaults. A name with no declared default fails loudly: silently
//! omitting it would produce documentation that is wrong, not merely
//! incomplete.

use crate::criteria::parse_criteria;
use crate::document::RenderedCheckDocument;
use crate::extract::ExtractError;
use crate::output::{AlarmDetails, CheckDetails};
use crate::render::RenderEnvironment;
use crate::vars::ConfigVariables;
use indexmap::IndexMap;
use tracing::debug;

/// Names intentionally never exposed as configurable.
///
/// `maas_alarm_local_consecutive_count` in particular affects SLAs and must
/// not be documented as something to change.
const IGNORED_VARIABLES: &[&str] = &[
    "maas_alarm_local_consecutive_count",
    "volume_group",
    "console_service_name",
];

/// Lower-level parameter names mapped to the configuration name that
/// actually controls them.
///
/// Filesystem checks are stamped out per device at deploy time using
/// generic threshold names; documentation should point at the top-level
/// variables instead.
const REDIRECTED_VARIABLES: &[(&str, &str)] = &[
    ("warning_threshold", "maas_filesystem_warning_threshold"),
    ("critical_threshold", "maas_filesystem_critical_threshold"),
];

/// Detail keys that are compound settings rather than scalar defaults.
const COMPOUND_DETAIL_KEYS: &[&str] = &["file", "url"];

/// Resolve every free variable in a rendered check document to its default.
///
/// `config` is this check's own copy of the variable store: the redirection
/// step writes redirected values back into it so the criteria re-render
/// sees them, and that mutation must not leak into other checks.
pub fn resolve_check(
    doc: &RenderedCheckDocument,
    config: &mut ConfigVariables,
    env: &RenderEnvironment,
    check_name: &str,
) -> Result<CheckDetails, ExtractError> {
    let mut details = CheckDetails::default();

    for (alarm_name, alarm) in &doc.alarms {
        let defaults = resolve_fragment(&alarm.criteria, config, env, check_name)?;

        let rendered = env
            .render_criteria(&alarm.criteria, config)
            .map_err(|e| ExtractError::TemplateSyntax {
                name: check_name.to_string(),
                source: e,
            })?;
        let criteria = parse_criteria(&rendered);

        debug!(
            check = %check_name,
            alarm = %alarm_name,
            variables = defaults.len(),
            records = criteria.len(),
            "Resolved alarm"
        );

        details
            .alarms
            .insert(alarm_name.clone(), AlarmDetails { defaults, criteria });
    }

    for (key, value) in &doc.details {
        // `args` is lower level than the documentation should go, and the
        // compound file/url settings are not simple scalar defaults.
        if key == "args" || COMPOUND_DETAIL_KEYS.contains(&key.as_str()) {
            continue;
        }

        let Some(fragment) = value.as_str() else {
            continue;
        };

        let defaults = resolve_fragment(fragment, config, env, check_name)?;
        if defaults.is_empty() {
            continue;
        }

        details.check_variables.extend(defaults);
    }

    Ok(details)
}

/// Extract a fragment's free variables and look up their defaults.
fn resolve_fragment(
    fragment: &str,
    config: &mut ConfigVariables,
    env: &RenderEnvironment,
    check_name: &str,
) -> Result<IndexMap<String, serde_yaml::Value>, ExtractError> {
    let mut names = env
        .undeclared_variables(fragment)
        .map_err(|e| ExtractError::TemplateSyntax {
            name: check_name.to_string(),
            source: e,
        })?;

    for ignored in IGNORED_VARIABLES {
        names.remove(*ignored);
    }

    for (from, to) in REDIRECTED_VARIABLES {
        if names.remove(*from) {
            names.insert(to.to_string());

            // The criteria text still says `{{ warning_threshold }}`, so
            // the redirect target's value must exist under the original
            // name for the re-render to produce a sensible number.
            let value = config
                .get(*to)
                .cloned()
                .ok_or_else(|| ExtractError::MissingDefault {
                    name: to.to_string(),
                    scope: check_name.to_string(),
                })?;
            config.insert(from.to_string(), value);
        }
    }

    let mut sorted: Vec<String> = names.into_iter().collect();
    sorted.sort();

    let mut defaults = IndexMap::new();
    for name in sorted {
        let value = config
            .get(&name)
            .cloned()
            .ok_or_else(|| ExtractError::MissingDefault {
                name: name.clone(),
                scope: check_name.to_string(),
            })?;
        defaults.insert(name, value);
    }

    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Status;
    use crate::document::load_check_document;

    fn test_config() -> ConfigVariables {
        serde_yaml::from_str(
            r#"
elasticsearch_process_names: ["elasticsearch"]
filebeat_process_names: ["filebeat"]
rsyslogd_process_names: ["rsyslogd"]
maas_swift_account_process_names: ["swift-account-server"]
maas_swift_container_process_names: ["swift-container-server"]
maas_swift_object_process_names: ["swift-object-server"]
maas_check_period: 60
maas_alarm_local_consecutive_count: 3
maas_filesystem_warning_threshold: 80.0
maas_filesystem_critical_threshold: 90.0
private_ping_check_count: 6
private_ping_count_threshold: 80
"#,
        )
        .unwrap()
    }

    fn resolve(doc_text: &str) -> Result<(CheckDetails, ConfigVariables), ExtractError> {
        let base = test_config();
        let env = RenderEnvironment::new(&base).unwrap();
        let doc = load_check_document(doc_text).unwrap();
        let mut config = base.clone();
        let details = resolve_check(&doc, &mut config, &env, "test_check")?;
        Ok((details, config))
    }

    #[test]
    fn test_alarm_defaults_and_criteria() {
        let (details, _) = resolve(
            r#"
alarms:
  Packet_loss:
    criteria: |
      :set consecutiveCount={{ maas_alarm_local_consecutive_count }}
      if (metric['available'] > {{ private_ping_count_threshold }}) {
        return new AlarmStatus(OK, "Ping responds as expected");
      }
      return new AlarmStatus(CRITICAL, "Packet loss has occurred");
"#,
        )
        .unwrap();

        let alarm = &details.alarms["Packet_loss"];
        assert_eq!(
            alarm.defaults["private_ping_count_threshold"],
            serde_yaml::Value::from(80)
        );

        assert_eq!(alarm.criteria.len(), 2);
        assert_eq!(alarm.criteria[0].status, Status::Ok);
        assert_eq!(alarm.criteria[0].condition, "metric['available'] > 80");
        assert_eq!(alarm.criteria[1].status, Status::Critical);
        assert_eq!(alarm.criteria[1].condition, "default");
    }

    #[test]
    fn test_ignored_variable_never_documented() {
        let (details, _) = resolve(
            r#"
alarms:
  noisy:
    criteria: |
      :set consecutiveCount={{ maas_alarm_local_consecutive_count }}
      (OK, "fine")
"#,
        )
        .unwrap();

        let alarm = &details.alarms["noisy"];
        assert!(!alarm.defaults.contains_key("maas_alarm_local_consecutive_count"));
    }

    #[test]
    fn test_redirected_variable_renamed_and_rendered() {
        let (details, config) = resolve(
            r#"
alarms:
  filesystem_full:
    criteria: |
      if (metric['used_percent'] > {{ warning_threshold }}) {
        return new AlarmStatus(WARNING, "filesystem is getting full");
      }
"#,
        )
        .unwrap();

        let alarm = &details.alarms["filesystem_full"];
        assert!(alarm.defaults.contains_key("maas_filesystem_warning_threshold"));
        assert!(!alarm.defaults.contains_key("warning_threshold"));

        // The redirect also backfills the original name so re-rendering
        // the criteria produced a real number.
        assert_eq!(
            config["warning_threshold"],
            serde_yaml::Value::from(80.0)
        );
        assert_eq!(
            alarm.criteria[0].condition,
            "metric['used_percent'] > 80.0"
        );
    }

    #[test]
    fn test_missing_default_fails_loudly() {
        let result = resolve(
            r#"
alarms:
  broken:
    criteria: |
      (metric['x'] > {{ not_a_declared_variable }})
      (CRITICAL, "boom")
"#,
        );

        match result {
            Err(ExtractError::MissingDefault { name, scope }) => {
                assert_eq!(name, "not_a_declared_variable");
                assert_eq!(scope, "test_check");
            }
            other => panic!("expected MissingDefault, got {:?}", other),
        }
    }

    #[test]
    fn test_check_wide_details_aggregate() {
        let (details, _) = resolve(
            r#"
details:
  count: "{{ private_ping_check_count }}"
  period: "{{ maas_check_period }}"
"#,
        )
        .unwrap();

        assert_eq!(
            details.check_variables["private_ping_check_count"],
            serde_yaml::Value::from(6)
        );
        assert_eq!(
            details.check_variables["maas_check_period"],
            serde_yaml::Value::from(60)
        );
    }

    #[test]
    fn test_empty_aggregate_dropped() {
        let (details, _) = resolve(
            r#"
details:
  static_value: "nothing templated here"
"#,
        )
        .unwrap();

        assert!(details.check_variables.is_empty());
    }

    #[test]
    fn test_args_file_and_url_details_skipped() {
        let (details, _) = resolve(
            r#"
details:
  args: "{{ not_a_declared_variable }}"
  file: "{{ not_a_declared_variable }}"
  url: "{{ not_a_declared_variable }}"
"#,
        )
        .unwrap();

        // None of these may even be inspected, or resolution would have
        // failed on the undeclared name.
        assert!(details.check_variables.is_empty());
    }

    #[test]
    fn test_non_string_detail_values_skipped() {
        let (details, _) = resolve(
            r#"
details:
  timeout: 30
  period: "{{ maas_check_period }}"
"#,
        )
        .unwrap();

        assert_eq!(details.check_variables.len(), 1);
        assert!(details.check_variables.contains_key("maas_check_period"));
    }
}
