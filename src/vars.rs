//! Default variable store - loads declared configuration defaults
//!
//! Every `*.yml` file in the variables directory contributes its top-level
//! keys to one flat mapping. Later files override earlier ones on key
//! collision (files are visited in sorted filename order, so the outcome is
//! deterministic, but callers should not rely on anything beyond "last
//! write wins"). A single malformed file fails the whole load: a partially
//! loaded store would make default resolution produce wrong documentation
//! instead of a visible failure.

use crate::extract::ExtractError;
use crate::fs::FileSystem;
use indexmap::IndexMap;
use std::path::Path;
use tracing::debug;

/// Flat mapping from variable name to its declared default value.
pub type ConfigVariables = IndexMap<String, serde_yaml::Value>;

/// Key that the live system computes at run time via a playbook fact.
///
/// There is no static default for it, so it is faked as a self-referential
/// placeholder string to keep downstream rendering from failing.
pub const RUNTIME_FACT_KEY: &str = "maas_swift_access_url_key";

/// Load all declared configuration variables from a directory of YAML files.
pub fn load_defaults<F: FileSystem>(fs: &F, vars_dir: &Path) -> Result<ConfigVariables, ExtractError> {
    let mut variables = ConfigVariables::new();

    let mut entries = fs.read_dir(vars_dir).map_err(|e| ExtractError::Io {
        path: vars_dir.to_path_buf(),
        reason: format!("{e:#}"),
    })?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    for entry in entries {
        if !entry.is_file() || !entry.name.ends_with(".yml") {
            continue;
        }

        let content = fs.read_to_string(entry.path()).map_err(|e| ExtractError::Io {
            path: entry.path.clone(),
            reason: format!("{e:#}"),
        })?;

        if content.trim().is_empty() {
            debug!(file = %entry.name, "Skipping empty variable file");
            continue;
        }

        let parsed: IndexMap<String, serde_yaml::Value> =
            serde_yaml::from_str(&content).map_err(|e| ExtractError::DataFormat {
                path: entry.path.clone(),
                source: e,
            })?;

        debug!(file = %entry.name, keys = parsed.len(), "Loaded variable file");
        variables.extend(parsed);
    }

    variables.insert(
        RUNTIME_FACT_KEY.to_string(),
        serde_yaml::Value::String(RUNTIME_FACT_KEY.to_string()),
    );

    Ok(variables)
}
