//! Rendered check document model and YAML loading with key recovery
//!
//! A partially rendered check template is a YAML document whose values may
//! still contain template expressions. One syntactic hazard survives partial
//! rendering: an unquoted expression used as a mapping key, e.g.
//!
//! ```yaml
//! details:
//!   {{ private_ssh_port }}: ssh
//! ```
//!
//! YAML reads the bare `{{ ... }}` as a nested flow mapping, so the key of
//! the outer mapping parses as a mapping rather than as the string the
//! template author meant. [`load_check_document`] recovers such keys in a
//! single normalization pass: the offending key's first scalar key text is
//! re-wrapped as the string `"{{ name }}"`. Only the key is recovered; the
//! associated value parses normally, and every other parse error propagates
//! unchanged.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Errors produced while loading a rendered check document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unexpected document structure: {0}")]
    Structure(String),
}

/// One alarm entry inside a check document
#[derive(Debug, Clone)]
pub struct Alarm {
    /// Criteria mini-language text, usually still containing template
    /// expressions after partial rendering.
    pub criteria: String,
}

/// The structured form of one partially rendered check template
#[derive(Debug, Clone)]
pub struct RenderedCheckDocument {
    pub label: Option<String>,
    pub alarms: IndexMap<String, Alarm>,
    pub details: IndexMap<String, Value>,
}

/// Parse partially rendered template text into a check document.
pub fn load_check_document(text: &str) -> Result<RenderedCheckDocument, DocumentError> {
    let value: Value = serde_yaml::from_str(text)?;
    let value = recover_keys(value);

    let doc = match value {
        Value::Mapping(m) => m,
        other => {
            return Err(DocumentError::Structure(format!(
                "expected a mapping at the top level, found {}",
                value_kind(&other)
            )))
        }
    };

    let label = doc
        .get(Value::from("label"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut alarms = IndexMap::new();
    if let Some(Value::Mapping(alarm_map)) = doc.get(Value::from("alarms")) {
        for (name, body) in alarm_map {
            let name = key_to_string(name);
            let criteria = body
                .get("criteria")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DocumentError::Structure(format!("alarm '{name}' has no criteria string"))
                })?
                .to_string();
            alarms.insert(name, Alarm { criteria });
        }
    }

    let mut details = IndexMap::new();
    if let Some(Value::Mapping(detail_map)) = doc.get(Value::from("details")) {
        for (key, val) in detail_map {
            details.insert(key_to_string(key), val.clone());
        }
    }

    Ok(RenderedCheckDocument {
        label,
        alarms,
        details,
    })
}

/// Walk the value tree and repair mapping keys that parsed as mappings.
fn recover_keys(value: Value) -> Value {
    match value {
        Value::Mapping(m) => {
            let mut rebuilt = Mapping::with_capacity(m.len());
            for (key, val) in m {
                let key = match key {
                    Value::Mapping(inner) => match first_scalar_key(&inner) {
                        Some(name) => Value::String(format!("{{{{ {name} }}}}")),
                        None => Value::Mapping(inner),
                    },
                    other => other,
                };
                rebuilt.insert(key, recover_keys(val));
            }
            Value::Mapping(rebuilt)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(recover_keys).collect()),
        other => other,
    }
}

/// The original literal text of a mangled key is the innermost scalar key.
fn first_scalar_key(mapping: &Mapping) -> Option<String> {
    let (key, _) = mapping.iter().next()?;
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Mapping(inner) => first_scalar_key(inner),
        _ => None,
    }
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => format!("{other:?}"),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_document() {
        let doc = load_check_document(
            r#"
label: ping_check
type: remote.ping
alarms:
  Packet_loss:
    label: Packet loss
    criteria: |
      if (metric['available'] > 80) {
details:
  count: "{{ private_ping_check_count }}"
"#,
        )
        .unwrap();

        assert_eq!(doc.label.as_deref(), Some("ping_check"));
        assert!(doc.alarms["Packet_loss"].criteria.contains("metric['available']"));
        assert_eq!(
            doc.details["count"],
            Value::String("{{ private_ping_check_count }}".to_string())
        );
    }

    #[test]
    fn test_unquoted_expression_key_recovered() {
        let doc = load_check_document(
            r#"
label: ssh_check
details:
  ports:
    {{ private_ssh_port }}: ssh
"#,
        )
        .unwrap();

        let ports = match &doc.details["ports"] {
            Value::Mapping(m) => m,
            other => panic!("expected mapping, got {:?}", other),
        };
        assert!(ports.contains_key(Value::from("{{ private_ssh_port }}")));
    }

    #[test]
    fn test_recovery_only_touches_the_key() {
        let doc = load_check_document(
            r#"
details:
  {{ private_ssh_port }}: 22
"#,
        )
        .unwrap();

        assert_eq!(
            doc.details["{{ private_ssh_port }}"],
            Value::from(22)
        );
    }

    #[test]
    fn test_other_parse_errors_propagate() {
        let result = load_check_document("alarms: [broken: {");
        assert!(matches!(result, Err(DocumentError::Yaml(_))));
    }

    #[test]
    fn test_alarm_without_criteria_is_a_structure_error() {
        let result = load_check_document(
            r#"
alarms:
  broken_alarm:
    label: no criteria here
"#,
        );
        assert!(matches!(result, Err(DocumentError::Structure(_))));
    }

    #[test]
    fn test_missing_alarms_and_details_are_empty() {
        let doc = load_check_document("label: bare").unwrap();
        assert!(doc.alarms.is_empty());
        assert!(doc.details.is_empty());
    }

    #[test]
    fn test_non_mapping_top_level_rejected() {
        let result = load_check_document("- just\n- a\n- list");
        assert!(matches!(result, Err(DocumentError::Structure(_))));
    }
}
