//! Extraction pipeline: templates directory in, check documentation out
//!
//! One extraction run loads the default variable store once, builds the
//! partial rendering environment once, then processes every check template
//! in sorted filename order. Each check gets its own clone of the variable
//! store, so the redirection step in resolution never leaks across checks
//! and per-check processing stays independent. Re-running on unchanged
//! input produces identical output.

use crate::config::CheckdocConfig;
use crate::document::load_check_document;
use crate::fs::FileSystem;
use crate::output::CheckDoc;
use crate::render::RenderEnvironment;
use crate::resolve::resolve_check;
use crate::vars::load_defaults;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Template filenames that never produce a standalone check.
///
/// `checks_base.yaml.j2` is the shared base with nothing to document;
/// `ceph_rgw_stats.yaml.j2` is known to fail partial rendering in this
/// engine's current form.
const SKIP_TEMPLATES: &[&str] = &["checks_base.yaml.j2", "ceph_rgw_stats.yaml.j2"];

/// Extension convention for check template files.
const TEMPLATE_SUFFIX: &str = ".yaml.j2";

/// Errors raised by an extraction run
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A file or directory could not be read.
    #[error("failed to read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// A variable file is not valid YAML. Fatal for the whole run: a
    /// partially loaded store would silently produce wrong documentation.
    #[error("invalid YAML in {}: {source}", path.display())]
    DataFormat {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An undeclared variable has no entry in the variable store. This is
    /// configuration drift, not a transient condition.
    #[error("no default declared for variable '{name}' (while processing {scope})")]
    MissingDefault { name: String, scope: String },

    /// A template fragment failed to parse or render.
    #[error("template '{name}' cannot be processed: {source}")]
    TemplateSyntax {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Documentation extractor over a checkout of monitoring playbooks
pub struct Extractor<F: FileSystem> {
    fs: F,
    config: CheckdocConfig,
}

impl<F: FileSystem> Extractor<F> {
    pub fn new(fs: F, config: CheckdocConfig) -> Self {
        Self { fs, config }
    }

    /// Run the extraction and return one [`CheckDoc`] per check template.
    ///
    /// A template that fails to render or parse is logged and skipped
    /// without aborting the run; a malformed variable file or a missing
    /// default aborts the whole run.
    pub fn extract(&self) -> Result<Vec<CheckDoc>, ExtractError> {
        let vars_path = self.config.vars_path();
        let templates_path = self.config.templates_path();

        let config_variables = load_defaults(&self.fs, &vars_path)?;
        info!(
            variables = config_variables.len(),
            vars_dir = %vars_path.display(),
            "Loaded configuration defaults"
        );

        let env = RenderEnvironment::new(&config_variables)?;

        let mut entries = self
            .fs
            .read_dir(&templates_path)
            .map_err(|e| ExtractError::Io {
                path: templates_path.clone(),
                reason: format!("{e:#}"),
            })?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut docs = Vec::new();
        for entry in entries {
            if !entry.is_file() || !entry.name.ends_with(TEMPLATE_SUFFIX) {
                continue;
            }

            if SKIP_TEMPLATES.contains(&entry.name.as_str()) {
                debug!(template = %entry.name, "Skipping listed template");
                continue;
            }

            let source = self
                .fs
                .read_to_string(entry.path())
                .map_err(|e| ExtractError::Io {
                    path: entry.path.clone(),
                    reason: format!("{e:#}"),
                })?;

            match self.extract_one(&entry.name, &source, &config_variables, &env) {
                Ok(doc) => docs.push(doc),
                // A template that cannot be processed must not take the
                // rest of the run down with it.
                Err(ExtractError::TemplateSyntax { name, source }) => {
                    warn!(template = %name, error = %source, "Skipping unprocessable template");
                }
                Err(other) => return Err(other),
            }
        }

        info!(checks = docs.len(), "Extraction complete");
        Ok(docs)
    }

    fn extract_one(
        &self,
        name: &str,
        source: &str,
        config_variables: &crate::vars::ConfigVariables,
        env: &RenderEnvironment,
    ) -> Result<CheckDoc, ExtractError> {
        let rendered = env.render(source).map_err(|e| ExtractError::TemplateSyntax {
            name: name.to_string(),
            source: e,
        })?;

        let doc = load_check_document(&rendered.text).map_err(|e| {
            ExtractError::TemplateSyntax {
                name: name.to_string(),
                source: minijinja::Error::new(
                    minijinja::ErrorKind::SyntaxError,
                    format!("partially rendered document is not valid YAML: {e}"),
                ),
            }
        })?;

        // Redirection mutates the variable store, so each check resolves
        // against its own copy.
        let mut check_variables = config_variables.clone();
        let details = resolve_check(&doc, &mut check_variables, env, name)?;

        let label = rendered
            .label
            .or_else(|| doc.label.clone())
            .unwrap_or_else(|| name.trim_end_matches(TEMPLATE_SUFFIX).to_string());

        Ok(CheckDoc { label, details })
    }
}
