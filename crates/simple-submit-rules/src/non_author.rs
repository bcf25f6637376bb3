//! Non-author approval gate
//!
//! For every label whose legacy section sets `nonAuthorApprovalRequired`,
//! the label function is re-applied without the change owner's positive
//! votes. Labels that end up blocking make the change NOT_READY. Failing
//! to load the owner or the votes is always a RULE_ERROR.

use simple_submit_core::{
    AccountId, Approval, LabelRecord, LabelType, ProjectState, KEY_REQUIRE_NON_AUTHOR_APPROVAL,
};

use crate::change::ChangeData;
use crate::rule::SubmitRule;
use crate::verdict::SubmitRecord;

pub const ERR_OWNER_UNAVAILABLE: &str = "Unable to fetch the change owner";
pub const ERR_APPROVALS_UNAVAILABLE: &str = "Unable to fetch labels and approvals for the change";

#[derive(Debug, Clone, Copy, Default)]
pub struct RequireNonAuthorApprovalRule;

impl RequireNonAuthorApprovalRule {
    pub fn new() -> Self {
        Self
    }

    fn enabled_labels(project: &ProjectState) -> Vec<LabelType> {
        project
            .label_types()
            .into_iter()
            .filter(|label| {
                project
                    .section_with_inheritance(&label.name)
                    .get_boolean(KEY_REQUIRE_NON_AUTHOR_APPROVAL, false)
            })
            .collect()
    }

    fn check_label(label: &LabelType, owner: AccountId, approvals: &[Approval]) -> LabelRecord {
        let qualifying = approvals
            .iter()
            .filter(|a| a.label == label.name)
            .filter(|a| a.value <= 0 || a.account != owner);
        label.function.check(label, qualifying)
    }
}

impl SubmitRule for RequireNonAuthorApprovalRule {
    fn evaluate(&self, change: &dyn ChangeData, project: &ProjectState) -> Option<SubmitRecord> {
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

        let blocking: Vec<LabelRecord> = Self::enabled_labels(project)
            .iter()
            .map(|label| Self::check_label(label, owner, &approvals))
            .filter(|record| record.status.is_blocking())
            .collect();

        if blocking.is_empty() {
            None
        } else {
            Some(SubmitRecord::not_ready().with_labels(blocking))
        }
    }
}
