//! Data Model: the submit configuration document exchanged with clients
//!
//! These types are a projection of a project's labels and plugin settings.
//! They are built fresh for every request and never stored as-is.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Result, SubmitRulesError};
use crate::label::{CopyScoreRule, LabelFunction};

/// Root document of the configuration endpoint.
///
/// On write, a `None` section is left untouched and an empty `labels` map
/// requests no changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, LabelDefinition>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<CommentsRules>,
}

impl SubmitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, name: impl Into<String>, definition: LabelDefinition) -> Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), definition);
        self
    }

    pub fn with_comments(mut self, comments: CommentsRules) -> Self {
        self.comments = Some(comments);
        self
    }

    pub fn label(&self, name: &str) -> Option<&LabelDefinition> {
        self.labels.as_ref().and_then(|labels| labels.get(name))
    }
}

impl fmt::Display for SubmitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubmitConfig{{labels=")?;
        match &self.labels {
            Some(labels) => {
                write!(f, "{{")?;
                for (i, (name, definition)) in labels.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, definition)?;
                }
                write!(f, "}}")?;
            }
            None => write!(f, "null")?,
        }
        match &self.comments {
            Some(comments) => write!(f, ", comments={}}}", comments),
            None => write!(f, ", comments=null}}"),
        }
    }
}

/// Policy-relevant facets of one label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDefinition {
    /// Approval function name, e.g. "MaxWithBlock"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// `None` leaves the flag unchanged on write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_self_approval: Option<bool>,

    /// Copy-score tokens. `None` leaves the flags unchanged on write, a set
    /// replaces all six flags.
    #[serde(
        default,
        rename = "copy_scores",
        skip_serializing_if = "Option::is_none"
    )]
    pub copy_score_rules: Option<BTreeSet<String>>,
}

impl LabelDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn ignore_self_approval(mut self, ignore: bool) -> Self {
        self.ignore_self_approval = Some(ignore);
        self
    }

    pub fn with_copy_scores<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.copy_score_rules = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Resolve `function` against the host's functions.
    ///
    /// `Ok(None)` when no function was given.
    pub fn resolve_function(&self) -> Result<Option<LabelFunction>> {
        match &self.function {
            None => Ok(None),
            Some(name) => LabelFunction::parse(name).map(Some).ok_or_else(|| {
                SubmitRulesError::bad_request(format!("Unknown label function {}", name))
            }),
        }
    }

    /// Recognized copy-score rules; unknown tokens are dropped
    pub fn copy_scores(&self) -> Option<BTreeSet<CopyScoreRule>> {
        self.copy_score_rules.as_ref().map(|tokens| {
            tokens
                .iter()
                .filter_map(|token| CopyScoreRule::from_token(token))
                .collect()
        })
    }
}

impl fmt::Display for LabelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = self.function.as_deref().unwrap_or("null");
        let ignore = self
            .ignore_self_approval
            .map(|b| b.to_string())
            .unwrap_or_else(|| "null".to_string());
        let copy_scores = self
            .copy_score_rules
            .as_ref()
            .map(|tokens| {
                format!(
                    "[{}]",
                    tokens.iter().cloned().collect::<Vec<_>>().join(", ")
                )
            })
            .unwrap_or_else(|| "null".to_string());
        write!(
            f,
            "LabelDefinition{{function={}, ignoreSelfApproval={}, copyScores={}}}",
            function, ignore, copy_scores
        )
    }
}

/// Comment related gates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentsRules {
    #[serde(default)]
    pub block_if_unresolved_comments: bool,
}

impl CommentsRules {
    pub fn new(block_if_unresolved_comments: bool) -> Self {
        Self {
            block_if_unresolved_comments,
        }
    }
}

impl fmt::Display for CommentsRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CommentsRules{{blockIfUnresolvedComments={}}}",
            self.block_if_unresolved_comments
        )
    }
}
