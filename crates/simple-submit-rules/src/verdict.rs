//! Submit records produced by submit rules
//!
//! A [`SubmitRecord`] is one rule's opinion about a change. A
//! [`SubmitSummary`] folds the records of every rule into the answer the
//! host shows: can the change be submitted, and what is still missing.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use simple_submit_core::LabelRecord;
use std::fmt;

/// Requirement type of the unresolved comments gate
pub const UNRESOLVED_COMMENTS_TYPE: &str = "unresolved_comments";

/// Requirement attached to every verdict of the unresolved comments gate
pub static UNRESOLVED_COMMENTS_REQUIREMENT: Lazy<SubmitRequirement> =
    Lazy::new(|| SubmitRequirement::new("Resolve all comments", UNRESOLVED_COMMENTS_TYPE));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitStatus {
    /// Nothing in this record blocks submission
    Ok,
    /// Something is still missing
    NotReady,
    /// The rule could not be evaluated
    RuleError,
}

impl fmt::Display for SubmitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmitStatus::Ok => "OK",
            SubmitStatus::NotReady => "NOT_READY",
            SubmitStatus::RuleError => "RULE_ERROR",
        };
        f.write_str(s)
    }
}

/// A condition a change must meet, described for humans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequirement {
    pub fallback_text: String,

    /// Machine readable requirement kind
    #[serde(rename = "type")]
    pub type_: String,
}

impl SubmitRequirement {
    pub fn new(fallback_text: impl Into<String>, type_: impl Into<String>) -> Self {
        Self {
            fallback_text: fallback_text.into(),
            type_: type_.into(),
        }
    }
}

/// One rule's verdict on a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRecord {
    pub status: SubmitStatus,

    /// Name the rule was registered under, filled in by the registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<LabelRecord>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<SubmitRequirement>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SubmitRecord {
    fn with_status(status: SubmitStatus) -> Self {
        Self {
            status,
            rule_name: None,
            labels: None,
            requirements: None,
            error_message: None,
        }
    }

    pub fn ok() -> Self {
        Self::with_status(SubmitStatus::Ok)
    }

    pub fn not_ready() -> Self {
        Self::with_status(SubmitStatus::NotReady)
    }

    /// A record reporting that the rule failed. `message` is shown to users
    /// and must not carry internal details.
    pub fn rule_error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::with_status(SubmitStatus::RuleError)
        }
    }

    pub fn with_labels(mut self, labels: Vec<LabelRecord>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_requirement(mut self, requirement: SubmitRequirement) -> Self {
        self.requirements
            .get_or_insert_with(Vec::new)
            .push(requirement);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == SubmitStatus::Ok
    }
}

/// A requirement as reported to users, with the status of the record it
/// came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequirementInfo {
    pub status: SubmitStatus,
    pub fallback_text: String,
    #[serde(rename = "type")]
    pub type_: String,
}

/// Combined verdict of every rule on a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitSummary {
    pub submittable: bool,
    pub requirements: Vec<SubmitRequirementInfo>,
    pub records: Vec<SubmitRecord>,
}

impl SubmitSummary {
    /// A change is submittable when at least one rule voted and every
    /// record is OK.
    pub fn from_records(records: Vec<SubmitRecord>) -> Self {
        let submittable = !records.is_empty() && records.iter().all(SubmitRecord::is_ok);
        let requirements = records
            .iter()
            .flat_map(|record| {
                record
                    .requirements
                    .iter()
                    .flatten()
                    .map(move |req| SubmitRequirementInfo {
                        status: record.status,
                        fallback_text: req.fallback_text.clone(),
                        type_: req.type_.clone(),
                    })
            })
            .collect();

        Self {
            submittable,
            requirements,
            records,
        }
    }

    /// Error messages of the rules that failed
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|r| r.status == SubmitStatus::RuleError)
            .filter_map(|r| r.error_message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_wire_format() {
        let value = serde_json::to_value(&*UNRESOLVED_COMMENTS_REQUIREMENT).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "fallback_text": "Resolve all comments", "type": "unresolved_comments" })
        );
    }

    #[test]
    fn test_rule_error_record() {
        let record = SubmitRecord::rule_error("Unable to fetch the change owner");
        assert_eq!(record.status, SubmitStatus::RuleError);
        assert!(record.labels.is_none());
        assert_eq!(record.status.to_string(), "RULE_ERROR");
    }

    #[test]
    fn test_summary_requires_every_record_ok() {
        let summary = SubmitSummary::from_records(vec![
            SubmitRecord::ok(),
            SubmitRecord::not_ready().with_requirement(UNRESOLVED_COMMENTS_REQUIREMENT.clone()),
        ]);
        assert!(!summary.submittable);
        assert_eq!(
            summary.requirements,
            vec![SubmitRequirementInfo {
                status: SubmitStatus::NotReady,
                fallback_text: "Resolve all comments".to_string(),
                type_: "unresolved_comments".to_string(),
            }]
        );

        assert!(SubmitSummary::from_records(vec![SubmitRecord::ok()]).submittable);
        assert!(!SubmitSummary::from_records(Vec::new()).submittable);
    }

    #[test]
    fn test_summary_lists_errors() {
        let summary = SubmitSummary::from_records(vec![
            SubmitRecord::rule_error("Error when counting unresolved comments"),
        ]);
        assert!(!summary.submittable);
        assert_eq!(
            summary.errors().collect::<Vec<_>>(),
            vec!["Error when counting unresolved comments"]
        );
    }
}
