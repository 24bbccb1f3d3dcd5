//! Criteria mini-language parser
//!
//! Alarm criteria are free-form text in a small line-oriented condition
//! language. Each interesting line carries one parenthesized clause: either
//! a condition (`(metric['available'] > 80)`) or a status
//! (`(OK, "Ping responds as expected")`). A status clause pairs with the
//! condition clause that most recently preceded it; a status with no
//! preceding condition is the block's fall-through and gets the condition
//! `"default"`. A condition with no following status is discarded.
//!
//! Clause matching handles parentheses nested exactly one level deep.
//! Deeper nesting is a known limitation of the matching rule, not an
//! error.

use serde::Serialize;

/// Alarm status emitted by a criteria clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Critical,
    Warning,
    Ok,
}

impl Status {
    /// Tokens as they appear at the start of a status clause.
    const TOKENS: &'static [(&'static str, Status)] = &[
        ("CRITICAL", Status::Critical),
        ("WARNING", Status::Warning),
        ("OK", Status::Ok),
    ];

    /// The status token as it appears in criteria text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Critical => "CRITICAL",
            Status::Warning => "WARNING",
            Status::Ok => "OK",
        }
    }

    fn from_clause(content: &str) -> Option<Status> {
        Status::TOKENS
            .iter()
            .find(|(token, _)| content.starts_with(token))
            .map(|(_, status)| *status)
    }
}

/// One status/condition/message triple parsed from a criteria block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriteriaRecord {
    pub status: Status,
    pub condition: String,
    pub message: String,
}

/// Condition used when a status clause has no preceding condition clause.
pub const DEFAULT_CONDITION: &str = "default";

/// Parse rendered criteria text into status/condition/message records.
pub fn parse_criteria(text: &str) -> Vec<CriteriaRecord> {
    // Matches a maximal parenthesized group with at most one nested level.
    // The outer parentheses are part of the match and stripped afterwards.
    let clause = regex::Regex::new(r"\(([^()]*|\([^()]*\))*\)").expect("valid regex");

    let mut records = Vec::new();
    let mut condition: Option<String> = None;

    for line in text.lines() {
        let content = match clause.find(line) {
            Some(m) => &m.as_str()[1..m.as_str().len() - 1],
            None => continue,
        };

        match Status::from_clause(content) {
            Some(status) => {
                let message = match content.find(',') {
                    Some(comma) => strip_quotes(content[comma + 1..].trim()),
                    None => String::new(),
                };

                records.push(CriteriaRecord {
                    status,
                    condition: condition.take().unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
                    message,
                });
            }
            None => {
                condition = Some(content.to_string());
            }
        }
    }

    records
}

fn strip_quotes(message: &str) -> String {
    let trimmed = message.trim();
    let stripped = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);
    stripped.to_string()
}
