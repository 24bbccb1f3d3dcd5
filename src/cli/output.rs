//! Output formatting for extracted check documentation
//!
//! Formatters for JSON, YAML, and human-readable text. The human format
//! is indentation-based: one block per check, alarms nested under the
//! check, variables and criteria nested under the alarm.

use anyhow::{Context, Result};
use std::fmt::Write as _;

use crate::output::CheckDoc;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Output formatter for extracted check documentation
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Creates a new output formatter with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the full set of extracted checks
    pub fn format_multiple(&self, docs: &[CheckDoc]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(docs).context("Failed to serialize checks to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(docs).context("Failed to serialize checks to YAML")
            }
            OutputFormat::Human => self.format_human(docs),
        }
    }

    fn format_human(&self, docs: &[CheckDoc]) -> Result<String> {
        let mut out = String::new();

        for doc in docs {
            writeln!(out, "Check: {}", doc.label)?;

            for (name, value) in &doc.details.check_variables {
                writeln!(out, "\tVariable: {} = {}", name, format_value(value)?)?;
            }

            for (alarm_name, alarm) in &doc.details.alarms {
                writeln!(out, "\tAlarm: {}", alarm_name)?;

                for (name, value) in &alarm.defaults {
                    writeln!(out, "\t\tVariable: {} = {}", name, format_value(value)?)?;
                }

                for record in &alarm.criteria {
                    writeln!(
                        out,
                        "\t\t{}: {} -> {}",
                        record.status.as_str(),
                        record.condition,
                        record.message
                    )?;
                }
            }
        }

        Ok(out)
    }
}

/// Render a YAML scalar for human output without quoting or trailing noise.
fn format_value(value: &serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        other => {
            let rendered =
                serde_yaml::to_string(other).context("Failed to render variable value")?;
            Ok(rendered.trim_end().to_string())
        }
    }
}
