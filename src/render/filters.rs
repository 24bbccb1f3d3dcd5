//! Ansible-compatible filters and tests used by check templates
//!
//! Check templates come from a configuration-management ecosystem and call
//! a handful of its filters/tests directly, so partial rendering needs them
//! registered. This is a curated set, not a full reimplementation: only
//! what the check templates actually invoke. Everything else (`default`,
//! `join`, `int`, ...) comes from minijinja's builtins.

use minijinja::value::Value;
use minijinja::{Environment, Error, ErrorKind};
use regex::Regex;

/// Register the filter/test extension set on an environment.
pub fn register(env: &mut Environment<'_>) {
    env.add_filter("bool", bool_filter);
    env.add_filter("ternary", ternary_filter);
    env.add_filter("regex_replace", regex_replace_filter);
    env.add_filter("regex_escape", regex_escape_filter);
    env.add_filter("to_json", to_json_filter);
    env.add_test("match", match_test);
    env.add_test("search", search_test);
}

/// Truthiness conversion with the usual yes/no/on/off string spellings.
fn bool_filter(value: Value) -> bool {
    if let Some(s) = value.as_str() {
        matches!(
            s.to_lowercase().as_str(),
            "yes" | "on" | "true" | "1" | "1.0"
        )
    } else {
        value.is_true()
    }
}

fn ternary_filter(value: Value, if_true: Value, if_false: Value) -> Value {
    if value.is_true() {
        if_true
    } else {
        if_false
    }
}

fn regex_replace_filter(value: Value, pattern: String, replacement: String) -> Result<String, Error> {
    let re = compile(&pattern)?;
    // Backreferences are spelled \1 upstream but $1 in the regex crate.
    let replacement = Regex::new(r"\\(\d+)")
        .expect("valid regex")
        .replace_all(&replacement, "$${$1}")
        .into_owned();
    Ok(re.replace_all(&value.to_string(), replacement.as_str()).into_owned())
}

fn regex_escape_filter(value: Value) -> String {
    regex::escape(&value.to_string())
}

fn to_json_filter(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot serialize value to JSON: {e}"),
        )
    })
}

/// Anchored regex test, matching from the start of the value.
fn match_test(value: Value, pattern: String) -> Result<bool, Error> {
    let re = compile(&format!("^(?:{pattern})"))?;
    Ok(re.is_match(&value.to_string()))
}

/// Unanchored regex test.
fn search_test(value: Value, pattern: String) -> Result<bool, Error> {
    let re = compile(&pattern)?;
    Ok(re.is_match(&value.to_string()))
}

fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid regular expression '{pattern}': {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment<'static> {
        let mut env = Environment::new();
        register(&mut env);
        env
    }

    #[test]
    fn test_bool_filter() {
        let env = env();
        assert_eq!(env.render_str("{{ 'yes' | bool }}", ()).unwrap(), "true");
        assert_eq!(env.render_str("{{ 'no' | bool }}", ()).unwrap(), "false");
        assert_eq!(env.render_str("{{ 1 | bool }}", ()).unwrap(), "true");
    }

    #[test]
    fn test_ternary_filter() {
        let env = env();
        assert_eq!(
            env.render_str("{{ true | ternary('up', 'down') }}", ()).unwrap(),
            "up"
        );
        assert_eq!(
            env.render_str("{{ false | ternary('up', 'down') }}", ()).unwrap(),
            "down"
        );
    }

    #[test]
    fn test_regex_replace_filter() {
        let env = env();
        assert_eq!(
            env.render_str("{{ 'host-01' | regex_replace('-[0-9]+$', '') }}", ())
                .unwrap(),
            "host"
        );
    }

    #[test]
    fn test_regex_replace_backreference() {
        let result = regex_replace_filter(
            Value::from("ab"),
            "(a)(b)".to_string(),
            r"\2\1".to_string(),
        )
        .unwrap();
        assert_eq!(result, "ba");
    }

    #[test]
    fn test_regex_escape_filter() {
        let env = env();
        assert_eq!(
            env.render_str("{{ 'a.b' | regex_escape }}", ()).unwrap(),
            r"a\.b"
        );
    }

    #[test]
    fn test_to_json_filter() {
        let env = env();
        assert_eq!(
            env.render_str("{{ ['a', 'b'] | to_json }}", ()).unwrap(),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn test_match_is_anchored_search_is_not() {
        let env = env();
        assert_eq!(
            env.render_str("{{ 'hostname' is match('host') }}", ()).unwrap(),
            "true"
        );
        assert_eq!(
            env.render_str("{{ 'hostname' is match('name') }}", ()).unwrap(),
            "false"
        );
        assert_eq!(
            env.render_str("{{ 'hostname' is search('name') }}", ()).unwrap(),
            "true"
        );
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let env = env();
        assert!(env.render_str("{{ 'x' is match('[') }}", ()).is_err());
    }
}
