//! Submit rule trait and the registry that runs them

use simple_submit_core::{ProjectState, ProjectStore};

use crate::change::ChangeData;
use crate::verdict::{SubmitRecord, SubmitSummary};

/// Shown when the change's project cannot be loaded
pub const ERR_PROJECT_UNAVAILABLE: &str = "Unable to load the project of the change";

/// A rule deciding whether a change may be submitted.
///
/// Rules are stateless per evaluation and never fail: problems are reported
/// as [`SubmitStatus::RuleError`](crate::SubmitStatus::RuleError) records.
/// `None` means the rule has no opinion on the change.
pub trait SubmitRule: Send + Sync {
    fn evaluate(&self, change: &dyn ChangeData, project: &ProjectState) -> Option<SubmitRecord>;
}

/// Named submit rules, evaluated in registration order
#[derive(Default)]
pub struct SubmitRuleRegistry {
    rules: Vec<(String, Box<dyn SubmitRule>)>,
}

impl SubmitRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` under `name`, replacing any rule of the same name
    pub fn register(mut self, name: impl Into<String>, rule: impl SubmitRule + 'static) -> Self {
        let name = name.into();
        let rule: Box<dyn SubmitRule> = Box::new(rule);
        match self.rules.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((name, rule)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule against the change. The project is loaded once and
    /// shared by all rules.
    pub fn evaluate(&self, change: &dyn ChangeData, store: &dyn ProjectStore) -> Vec<SubmitRecord> {
        let project = match store.project_state(change.project()) {
            Ok(project) => project,
            Err(e) => {
                tracing::error!(
                    change = change.change_id(),
                    project = change.project(),
                    error = %e,
                    "cannot load project for submit rules"
                );
                return self
                    .rules
                    .iter()
                    .map(|(name, _)| named(SubmitRecord::rule_error(ERR_PROJECT_UNAVAILABLE), name))
                    .collect();
            }
        };

        self.rules
            .iter()
            .filter_map(|(name, rule)| {
                let record = rule.evaluate(change, &project)?;
                tracing::debug!(
                    change = change.change_id(),
                    rule = %name,
                    status = %record.status,
                    "submit rule evaluated"
                );
                Some(named(record, name))
            })
            .collect()
    }

    pub fn summarize(&self, change: &dyn ChangeData, store: &dyn ProjectStore) -> SubmitSummary {
        SubmitSummary::from_records(self.evaluate(change, store))
    }
}

fn named(mut record: SubmitRecord, name: &str) -> SubmitRecord {
    record.rule_name = Some(name.to_string());
    record
}
