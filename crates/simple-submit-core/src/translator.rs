//! Config translation between [`SubmitConfig`] and project configs
//!
//! [`ConfigTranslator::read`] projects a resolved project onto the document
//! clients see. [`ConfigTranslator::write`] applies a document onto a
//! project's own config snapshot. Every label of a write is validated before
//! the snapshot is touched, so a rejected write leaves it unchanged.

use std::collections::{BTreeMap, BTreeSet};

use crate::context::{PluginContext, KEY_BLOCK_IF_UNRESOLVED_COMMENTS};
use crate::data_model::{CommentsRules, LabelDefinition, SubmitConfig};
use crate::error::{Result, SubmitRulesError};
use crate::label::{CopyScoreRule, LabelType};
use crate::project::{ProjectConfig, ProjectState};

/// Copy-score tokens set on `label`
pub fn extract_copy_scores(label: &LabelType) -> BTreeSet<String> {
    CopyScoreRule::ALL
        .into_iter()
        .filter(|rule| label.copy_score(*rule))
        .map(|rule| rule.token().to_string())
        .collect()
}

/// Set each copy-score flag of `label` to whether `rules` contains it
pub fn apply_copy_scores(rules: &BTreeSet<CopyScoreRule>, label: &mut LabelType) {
    for rule in CopyScoreRule::ALL {
        label.set_copy_score(rule, rules.contains(&rule));
    }
}

/// An ancestor defines `name` with `can_override` unset, so a local
/// definition is shadowed
fn locked_by_ancestor(state: &ProjectState, name: &str) -> bool {
    state
        .ancestors()
        .filter_map(|ancestor| ancestor.labels.get(name))
        .any(|label| !label.can_override)
}

fn locked(name: &str) -> SubmitRulesError {
    SubmitRulesError::bad_request(format!(
        "The label {} is inherited and cannot be overridden.",
        name
    ))
}

/// Codec between the submit config document and a project config
pub struct ConfigTranslator<'a> {
    plugin: &'a PluginContext,
}

impl<'a> ConfigTranslator<'a> {
    pub fn new(plugin: &'a PluginContext) -> Self {
        Self { plugin }
    }

    /// Project `state` onto a [`SubmitConfig`]. Never fails; unset values
    /// read as defaults.
    pub fn read(&self, state: &ProjectState) -> SubmitConfig {
        let plugin_config = state.plugin_config_with_inheritance(&self.plugin.plugin_name);
        let comments = CommentsRules::new(
            plugin_config.get_boolean(KEY_BLOCK_IF_UNRESOLVED_COMMENTS, false),
        );

        let labels: BTreeMap<String, LabelDefinition> = state
            .label_types()
            .iter()
            .map(|label| (label.name.clone(), Self::label_definition(label)))
            .collect();

        SubmitConfig {
            labels: Some(labels),
            comments: Some(comments),
        }
    }

    fn label_definition(label: &LabelType) -> LabelDefinition {
        LabelDefinition {
            function: Some(label.function.name().to_string()),
            ignore_self_approval: Some(label.ignore_self_approval),
            copy_score_rules: Some(extract_copy_scores(label)),
        }
    }

    /// Apply `input` onto `config`, the editable snapshot of the project
    /// `state` was resolved for, and return the resulting projection.
    ///
    /// On error `config` is left exactly as it was.
    pub fn write(
        &self,
        state: &ProjectState,
        config: &mut ProjectConfig,
        input: &SubmitConfig,
    ) -> Result<SubmitConfig> {
        let mut updated = Vec::new();
        if let Some(labels) = &input.labels {
            for (name, definition) in labels {
                updated.push(self.edit_label(state, config, name, definition)?);
            }
        }

        for label in updated {
            config.labels.insert(label.name.clone(), label);
        }

        if let Some(comments) = &input.comments {
            config
                .plugin_config_mut(&self.plugin.plugin_name)
                .set_boolean(
                    KEY_BLOCK_IF_UNRESOLVED_COMMENTS,
                    comments.block_if_unresolved_comments,
                );
        }

        let edited = state.with_own_config(config.clone());
        Ok(self.read(&edited))
    }

    /// Validate `definition` and return the edited copy of the label
    fn edit_label(
        &self,
        state: &ProjectState,
        config: &ProjectConfig,
        name: &str,
        definition: &LabelDefinition,
    ) -> Result<LabelType> {
        let mut label = match config.labels.get(name) {
            Some(_) if locked_by_ancestor(state, name) => return Err(locked(name)),
            Some(own) => own.clone(),
            None => self.inherited_label(state, name)?,
        };

        if let Some(function) = definition.resolve_function()? {
            let disallowed = self.plugin.disallowed_label_functions(name);
            if disallowed.iter().any(|f| f == function.name()) {
                return Err(SubmitRulesError::bad_request(format!(
                    "{} disallowed for label {}",
                    function, name
                )));
            }
            label.function = function;
        }

        if let Some(ignore) = definition.ignore_self_approval {
            label.ignore_self_approval = ignore;
        }

        if let Some(rules) = definition.copy_scores() {
            let disallowed = self.plugin.disallowed_copy_score_rules(name);
            let denied: Vec<&str> = rules
                .iter()
                .map(|rule| rule.token())
                .filter(|token| disallowed.iter().any(|d| d == token))
                .collect();
            if !denied.is_empty() {
                return Err(SubmitRulesError::bad_request(format!(
                    "copy scores {} disallowed for label {}",
                    denied.join(", "),
                    name
                )));
            }
            apply_copy_scores(&rules, &mut label);
        }

        Ok(label)
    }

    /// Local copy of an inherited label, used when the project does not
    /// define `name` itself
    fn inherited_label(&self, state: &ProjectState, name: &str) -> Result<LabelType> {
        match state.label_type(name) {
            Some(label) if label.can_override => {
                tracing::debug!(
                    project = state.name(),
                    label = name,
                    "copying inherited label into project"
                );
                Ok(label)
            }
            Some(_) => Err(locked(name)),
            None => Err(SubmitRulesError::bad_request(format!(
                "The label {} does not exist. You can't change its config.",
                name
            ))),
        }
    }
}
