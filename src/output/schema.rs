//! Serializable output records for extracted check documentation
//!
//! The wire shape mirrors the documented details mapping: alarm names map
//! to their configurable defaults plus a reserved `_criteria` key, and
//! check-wide defaults aggregate under the reserved `_check_variables`
//! key. An aggregate contributing no defaults is dropped entirely.

use crate::criteria::CriteriaRecord;
use indexmap::IndexMap;
use serde::Serialize;

/// Configurable defaults resolved for one alarm, plus its trigger records
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlarmDetails {
    #[serde(flatten)]
    pub defaults: IndexMap<String, serde_yaml::Value>,

    #[serde(rename = "_criteria")]
    pub criteria: Vec<CriteriaRecord>,
}

/// Details mapping for one check: check-wide defaults and per-alarm entries
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckDetails {
    #[serde(
        rename = "_check_variables",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub check_variables: IndexMap<String, serde_yaml::Value>,

    #[serde(flatten)]
    pub alarms: IndexMap<String, AlarmDetails>,
}

/// One extracted check: its label and details mapping
#[derive(Debug, Clone, Serialize)]
pub struct CheckDoc {
    pub label: String,
    pub details: CheckDetails,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{CriteriaRecord, Status};

    fn sample_doc() -> CheckDoc {
        let mut defaults = IndexMap::new();
        defaults.insert(
            "private_ping_count_threshold".to_string(),
            serde_yaml::Value::from(80),
        );

        let mut alarms = IndexMap::new();
        alarms.insert(
            "Packet_loss".to_string(),
            AlarmDetails {
                defaults,
                criteria: vec![CriteriaRecord {
                    status: Status::Ok,
                    condition: "metric['available'] > 80".to_string(),
                    message: "Ping responds as expected".to_string(),
                }],
            },
        );

        let mut check_variables = IndexMap::new();
        check_variables.insert(
            "private_ping_check_count".to_string(),
            serde_yaml::Value::from(6),
        );

        CheckDoc {
            label: "private_ping_check--inventory_hostname".to_string(),
            details: CheckDetails {
                check_variables,
                alarms,
            },
        }
    }

    #[test]
    fn test_reserved_keys_in_json() {
        let json = serde_json::to_value(sample_doc()).unwrap();
        let details = &json["details"];

        assert_eq!(details["_check_variables"]["private_ping_check_count"], 6);
        assert_eq!(
            details["Packet_loss"]["private_ping_count_threshold"],
            80
        );
        assert_eq!(
            details["Packet_loss"]["_criteria"][0]["status"],
            "OK"
        );
    }

    #[test]
    fn test_empty_check_variables_dropped() {
        let mut doc = sample_doc();
        doc.details.check_variables.clear();

        let json = serde_json::to_value(doc).unwrap();
        assert!(json["details"].get("_check_variables").is_none());
    }
}
