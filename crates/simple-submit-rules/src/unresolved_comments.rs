//! Unresolved comments gate

use simple_submit_core::{ProjectState, DEFAULT_PLUGIN_NAME, KEY_BLOCK_IF_UNRESOLVED_COMMENTS};

use crate::change::ChangeData;
use crate::rule::SubmitRule;
use crate::verdict::{SubmitRecord, UNRESOLVED_COMMENTS_REQUIREMENT};

pub const ERR_COUNTING_COMMENTS: &str = "Error when counting unresolved comments";

/// Blocks changes with unresolved comments when the project enables
/// `blockIfUnresolvedComments` in its plugin settings. An unknown count
/// blocks as well.
#[derive(Debug, Clone)]
pub struct NoUnresolvedCommentsRule {
    plugin_name: String,
}

impl NoUnresolvedCommentsRule {
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
        }
    }
}

impl Default for NoUnresolvedCommentsRule {
    fn default() -> Self {
        Self::new(DEFAULT_PLUGIN_NAME)
    }
}

impl SubmitRule for NoUnresolvedCommentsRule {
    fn evaluate(&self, change: &dyn ChangeData, project: &ProjectState) -> Option<SubmitRecord> {
        let enabled = project
            .plugin_config_with_inheritance(&self.plugin_name)
            .get_boolean(KEY_BLOCK_IF_UNRESOLVED_COMMENTS, false);
        if !enabled {
            return None;
        }

        let record = match change.unresolved_comment_count() {
            Ok(Some(0)) => SubmitRecord::ok(),
            Ok(_) => SubmitRecord::not_ready(),
            Err(e) => {
                tracing::error!(change = change.change_id(), error = %e, "cannot count unresolved comments");
                return Some(SubmitRecord::rule_error(ERR_COUNTING_COMMENTS));
            }
        };
        Some(record.with_requirement(UNRESOLVED_COMMENTS_REQUIREMENT.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ChangeLookup, InMemoryChange};
    use crate::verdict::SubmitStatus;
    use simple_submit_core::{AccountId, ProjectConfig};

    fn project(enabled: bool) -> ProjectState {
        ProjectState::standalone(ProjectConfig::new("p").with_plugin_flag(
            DEFAULT_PLUGIN_NAME,
            KEY_BLOCK_IF_UNRESOLVED_COMMENTS,
            enabled,
        ))
    }

    fn change(count: Option<u32>) -> InMemoryChange {
        InMemoryChange::new("1", "p", AccountId(1)).with_unresolved_comments(count)
    }

    #[test]
    fn test_disabled_by_default() {
        let state = ProjectState::standalone(ProjectConfig::new("p"));
        assert!(NoUnresolvedCommentsRule::default().evaluate(&change(Some(3)), &state).is_none());
        assert!(NoUnresolvedCommentsRule::default().evaluate(&change(Some(3)), &project(false)).is_none());
    }

    #[test]
    fn test_states() {
        let rule = NoUnresolvedCommentsRule::default();
        for (count, status) in [
            (Some(0), SubmitStatus::Ok),
            (Some(2), SubmitStatus::NotReady),
            (None, SubmitStatus::NotReady),
        ] {
            let record = rule.evaluate(&change(count), &project(true)).unwrap();
            assert_eq!(record.status, status, "[case {:?}]", count);
            assert!(record.labels.is_none());
            assert_eq!(
                record.requirements,
                Some(vec![UNRESOLVED_COMMENTS_REQUIREMENT.clone()])
            );
        }
    }

    #[test]
    fn test_count_failure_is_rule_error() {
        let change = change(Some(0)).failing(ChangeLookup::UnresolvedComments);
        let record = NoUnresolvedCommentsRule::default()
            .evaluate(&change, &project(true))
            .unwrap();
        assert_eq!(record.status, SubmitStatus::RuleError);
        assert_eq!(record.error_message.as_deref(), Some(ERR_COUNTING_COMMENTS));
    }

    #[test]
    fn test_reads_settings_of_its_own_plugin_name() {
        let rule = NoUnresolvedCommentsRule::new("renamed");
        assert!(rule.evaluate(&change(Some(1)), &project(true)).is_none());
    }
}
