//! The host's default label rule
//!
//! Applies every label's function to the votes on the change. Labels with
//! `ignore_self_approval` do not count the owner's positive votes.

use simple_submit_core::{LabelRecord, ProjectState};

use crate::change::ChangeData;
use crate::non_author::{ERR_APPROVALS_UNAVAILABLE, ERR_OWNER_UNAVAILABLE};
use crate::rule::SubmitRule;
use crate::verdict::SubmitRecord;

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLabelRule;

impl SubmitRule for DefaultLabelRule {
    fn evaluate(&self, change: &dyn ChangeData, project: &ProjectState) -> Option<SubmitRecord> {
        let labels = project.label_types();

        let owner = match change.owner() {
            Ok(owner) => owner,
            Err(e) => {
                tracing::error!(change = change.change_id(), error = %e, "cannot load change owner");
                return Some(SubmitRecord::rule_error(ERR_OWNER_UNAVAILABLE));
            }
        };
        let approvals = match change.current_approvals() {
            Ok(approvals) => approvals,
            Err(e) => {
                tracing::error!(change = change.change_id(), error = %e, "cannot load approvals");
                return Some(SubmitRecord::rule_error(ERR_APPROVALS_UNAVAILABLE));
            }
        };

        let records: Vec<LabelRecord> = labels
            .iter()
            .map(|label| {
                let votes = approvals.iter().filter(|a| a.label == label.name).filter(|a| {
                    !(label.ignore_self_approval && a.account == owner && a.value > 0)
                });
                label.function.check(label, votes)
            })
            .collect();

        let record = if records.iter().any(|r| r.status.is_blocking()) {
            SubmitRecord::not_ready()
        } else {
            SubmitRecord::ok()
        };
        Some(record.with_labels(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::InMemoryChange;
    use crate::verdict::SubmitStatus;
    use simple_submit_core::{AccountId, LabelStatus, LabelType, ProjectConfig};

    const AUTHOR: AccountId = AccountId(7);

    fn project(ignore_self_approval: bool) -> ProjectState {
        let mut label = LabelType::code_review();
        label.ignore_self_approval = ignore_self_approval;
        ProjectState::standalone(ProjectConfig::new("p").with_label(label))
    }

    #[test]
    fn test_self_approval_counts_by_default() {
        let change = InMemoryChange::new("1", "p", AUTHOR).with_vote("Code-Review", AUTHOR, 2);
        let record = DefaultLabelRule.evaluate(&change, &project(false)).unwrap();
        assert_eq!(record.status, SubmitStatus::Ok);
    }

    #[test]
    fn test_ignored_self_approval() {
        let change = InMemoryChange::new("1", "p", AUTHOR).with_vote("Code-Review", AUTHOR, 2);
        let record = DefaultLabelRule.evaluate(&change, &project(true)).unwrap();
        assert_eq!(record.status, SubmitStatus::NotReady);
        assert_eq!(record.labels.unwrap()[0].status, LabelStatus::Need);
    }

    #[test]
    fn test_no_labels_is_ok() {
        let change = InMemoryChange::new("1", "p", AUTHOR);
        let state = ProjectState::standalone(ProjectConfig::new("p"));
        let record = DefaultLabelRule.evaluate(&change, &state).unwrap();
        assert!(record.is_ok());
        assert_eq!(record.labels, Some(Vec::new()));
    }
}
