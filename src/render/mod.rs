//! Partial rendering environment for check templates
//!
//! Check templates are rendered with deliberately incomplete input: just
//! enough global placeholder variables for their alarm/detail structure to
//! come out, while check-specific expressions (alarm criteria, per-alarm
//! thresholds) stay behind as literal `{{ name }}` text for later analysis.
//!
//! Every name the environment does not know resolves to an
//! [`Unresolved`] sentinel rather than an undefined, so a template never
//! fails on first-level attribute access or string conversion of a name
//! that only exists at deploy time.

mod filters;
mod undefined;

pub use undefined::Unresolved;

use crate::extract::ExtractError;
use crate::vars::ConfigVariables;
use indexmap::IndexMap;
use minijinja::value::{Enumerator, Object, Value};
use minijinja::{context, Environment, UndefinedBehavior};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Host/identity placeholder names, rendered as themselves.
///
/// These are set at the top level of most checks (labels mostly), so they
/// must resolve to something printable for the document structure to
/// survive partial rendering.
const IDENTITY_GLOBALS: &[&str] = &[
    "inventory_hostname",
    "ansible_hostname",
    "ansible_host",
    "ansible_nodename",
    "ansible_fqdn",
    "container_name",
    "maas_plugin_dir",
    "maas_lb_name",
];

/// Process-name list variables copied verbatim from the config defaults.
///
/// Several checks create one alarm per configured process name, so the
/// iteration count affects documentation correctness and these cannot be
/// faked.
const PROCESS_NAME_GLOBALS: &[&str] = &[
    "elasticsearch_process_names",
    "filebeat_process_names",
    "rsyslogd_process_names",
    "maas_swift_account_process_names",
    "maas_swift_container_process_names",
    "maas_swift_object_process_names",
];

/// Root render context: known globals, sentinel for everything else.
#[derive(Debug)]
struct PartialScope {
    globals: IndexMap<String, Value>,
}

impl Object for PartialScope {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let name = key.as_str()?;
        Some(
            self.globals
                .get(name)
                .cloned()
                .unwrap_or_else(|| Unresolved::value(name)),
        )
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.globals.keys().map(|k| Value::from(k.as_str())).collect())
    }
}

/// Result of partially rendering one check template
#[derive(Debug)]
pub struct PartialRender {
    /// Rendered document text, with unresolved expressions left verbatim.
    pub text: String,
    /// Value of a template-exported `label` variable, if the template set one.
    pub label: Option<String>,
}

/// Templating environment configured for partial rendering.
pub struct RenderEnvironment {
    env: Environment<'static>,
    context: Value,
    global_names: HashSet<String>,
}

impl RenderEnvironment {
    /// Build the environment and its global placeholder namespace.
    ///
    /// Process-name lists come straight from `config`; a missing list is a
    /// missing default and fails loudly.
    pub fn new(config: &ConfigVariables) -> Result<Self, ExtractError> {
        let mut globals: IndexMap<String, Value> = IndexMap::new();

        for name in IDENTITY_GLOBALS {
            globals.insert(name.to_string(), Value::from(*name));
        }

        // These exclusion patterns are generated at deploy time.
        globals.insert("maas_excluded_checks_regex".to_string(), Value::from(""));
        globals.insert("maas_excluded_alarms_regex".to_string(), Value::from(""));

        // The disk utilisation check iterates over enumerated devices and
        // the ceph osd stats check over host ids; give both a one-element
        // stand-in so the loops produce one documented alarm.
        globals.insert(
            "maas_disk_util_devices".to_string(),
            Value::from(vec!["device"]),
        );
        globals.insert(
            "ceph_osd_host".to_string(),
            context! { osd_ids => vec!["id"] },
        );

        for name in PROCESS_NAME_GLOBALS {
            let value = config.get(*name).ok_or_else(|| ExtractError::MissingDefault {
                name: name.to_string(),
                scope: "globals".to_string(),
            })?;
            globals.insert(name.to_string(), Value::from_serialize(value));
        }

        // A few labels use `item` from list-iteration constructs.
        globals.insert(
            "item".to_string(),
            context! {
                label => "label",
                key => "key",
                filesystem => "<filesystem>",
            },
        );

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        filters::register(&mut env);

        let global_names = globals.keys().cloned().collect();
        let context = Value::from_object(PartialScope { globals });

        Ok(Self {
            env,
            context,
            global_names,
        })
    }

    /// Partially render one check template with no per-call variables.
    pub fn render(&self, source: &str) -> Result<PartialRender, minijinja::Error> {
        let source = self.rewrite_divisions(source);
        let template = self.env.template_from_str(&source)?;
        let (text, state) = template.render_and_return_state(self.context.clone())?;

        let label = state
            .lookup("label")
            .filter(|v| !v.is_undefined() && v.downcast_object_ref::<Unresolved>().is_none())
            .and_then(|v| v.as_str().map(str::to_string));

        Ok(PartialRender { text, label })
    }

    /// Extract the free variable names referenced by a template fragment.
    pub fn undeclared_variables(&self, source: &str) -> Result<HashSet<String>, minijinja::Error> {
        let template = self.env.template_from_str(source)?;
        Ok(template.undeclared_variables(false))
    }

    /// Re-render criteria text with fully populated configuration defaults.
    pub fn render_criteria(
        &self,
        source: &str,
        config: &ConfigVariables,
    ) -> Result<String, minijinja::Error> {
        self.env.render_str(source, Value::from_serialize(config))
    }

    /// Rewrite `{{ a / b }}` to `{{ a }}` when the numerator is unresolved.
    ///
    /// minijinja offers no arithmetic hook on dynamic objects, so the
    /// division-tolerance rule is applied to the template source instead:
    /// dividing a value that partial rendering cannot know yields just the
    /// numerator's literal expression, same as the reference behavior.
    fn rewrite_divisions(&self, source: &str) -> String {
        let division =
            Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*/\s*[^}]+?\s*\}\}").expect("valid regex");

        division
            .replace_all(source, |caps: &regex::Captures<'_>| {
                let numerator = &caps[1];
                if self.global_names.contains(numerator) {
                    caps[0].to_string()
                } else {
                    trace!(numerator, "Rewriting division on unresolved value");
                    format!("{{{{ {numerator} }}}}")
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ConfigVariables {
        let yaml = r#"
elasticsearch_process_names: ["elasticsearch"]
filebeat_process_names: ["filebeat"]
rsyslogd_process_names: ["rsyslogd"]
maas_swift_account_process_names: ["swift-account-server"]
maas_swift_container_process_names: ["swift-container-server"]
maas_swift_object_process_names: ["swift-object-server"]
maas_check_period: 60
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_unknown_name_survives_as_expression() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let out = env.render("period: {{ maas_ping_period }}").unwrap();
        assert_eq!(out.text, "period: {{ maas_ping_period }}");
    }

    #[test]
    fn test_identity_global_renders_as_itself() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let out = env.render("label: ping--{{ inventory_hostname }}").unwrap();
        assert_eq!(out.text, "label: ping--inventory_hostname");
    }

    #[test]
    fn test_attribute_access_on_unknown_name() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let out = env.render("{{ osd_host.osd_ids }}").unwrap();
        assert_eq!(out.text, "{{ osd_host }}");
    }

    #[test]
    fn test_process_name_lists_drive_iteration() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let out = env
            .render("{% for p in elasticsearch_process_names %}{{ p }}{% endfor %}")
            .unwrap();
        assert_eq!(out.text, "elasticsearch");
    }

    #[test]
    fn test_missing_process_name_list_fails_loudly() {
        let config = ConfigVariables::new();
        let result = RenderEnvironment::new(&config);
        assert!(matches!(result, Err(ExtractError::MissingDefault { .. })));
    }

    #[test]
    fn test_division_on_unresolved_keeps_numerator() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let out = env
            .render("rate: {{ maas_queue_threshold / maas_check_period }}")
            .unwrap();
        assert_eq!(out.text, "rate: {{ maas_queue_threshold }}");
    }

    #[test]
    fn test_item_iteration_placeholder() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let out = env.render("fs: {{ item.filesystem }}").unwrap();
        assert_eq!(out.text, "fs: <filesystem>");
    }

    #[test]
    fn test_exported_label_is_visible() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let out = env
            .render("{% set label = 'ping--' ~ inventory_hostname %}label: {{ label }}")
            .unwrap();
        assert_eq!(out.label.as_deref(), Some("ping--inventory_hostname"));
    }

    #[test]
    fn test_label_absent_when_not_exported() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let out = env.render("label: plain").unwrap();
        assert_eq!(out.label, None);
    }

    #[test]
    fn test_undeclared_variable_extraction() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let vars = env
            .undeclared_variables("{{ warning_threshold }} and {{ maas_check_period }}")
            .unwrap();
        assert!(vars.contains("warning_threshold"));
        assert!(vars.contains("maas_check_period"));
    }

    #[test]
    fn test_render_criteria_with_defaults() {
        let env = RenderEnvironment::new(&test_config()).unwrap();
        let rendered = env
            .render_criteria("if (x > {{ maas_check_period }})", &test_config())
            .unwrap();
        assert_eq!(rendered, "if (x > 60)");
    }
}
