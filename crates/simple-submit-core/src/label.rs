//! Host label model
//!
//! Labels are the voting dimensions of a change ("Code-Review", "Verified").
//! Each label carries an approval function that reduces the votes cast on a
//! change into a per-label status, plus six copy-score flags deciding which
//! votes survive a new patch set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric account identifier of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Approval functions known to the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelFunction {
    #[default]
    MaxWithBlock,
    AnyWithBlock,
    MaxNoBlock,
    NoBlock,
    NoOp,
    PatchSetLock,
}

impl LabelFunction {
    pub const ALL: [LabelFunction; 6] = [
        LabelFunction::MaxWithBlock,
        LabelFunction::AnyWithBlock,
        LabelFunction::MaxNoBlock,
        LabelFunction::NoBlock,
        LabelFunction::NoOp,
        LabelFunction::PatchSetLock,
    ];

    /// Resolve a function by its configured name. Names are case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LabelFunction::MaxWithBlock => "MaxWithBlock",
            LabelFunction::AnyWithBlock => "AnyWithBlock",
            LabelFunction::MaxNoBlock => "MaxNoBlock",
            LabelFunction::NoBlock => "NoBlock",
            LabelFunction::NoOp => "NoOp",
            LabelFunction::PatchSetLock => "PatchSetLock",
        }
    }

    /// A maximum negative vote blocks the label
    pub fn is_block(&self) -> bool {
        matches!(self, LabelFunction::MaxWithBlock | LabelFunction::AnyWithBlock)
    }

    /// The label needs a maximum positive vote to be OK
    pub fn requires_max_value(&self) -> bool {
        matches!(self, LabelFunction::MaxWithBlock | LabelFunction::MaxNoBlock)
    }

    /// Reduce the approvals cast on `label` into a status.
    ///
    /// Callers pass only approvals that belong to `label`. Zero votes are
    /// ignored; a maximum negative vote on a blocking function rejects the
    /// label immediately.
    pub fn check<'a, I>(&self, label: &LabelType, approvals: I) -> LabelRecord
    where
        I: IntoIterator<Item = &'a Approval>,
    {
        let mut record = LabelRecord {
            label: label.name.clone(),
            status: if self.requires_max_value() {
                LabelStatus::Need
            } else {
                LabelStatus::May
            },
            applied_by: None,
        };

        for approval in approvals {
            if approval.value == 0 {
                continue;
            }

            if self.is_block() && label.is_max_negative(approval.value) {
                record.applied_by = Some(approval.account);
                record.status = LabelStatus::Reject;
                return record;
            }

            if label.is_max_positive(approval.value) || !self.requires_max_value() {
                record.applied_by = Some(approval.account);
                record.status = if self.requires_max_value() {
                    LabelStatus::Ok
                } else {
                    LabelStatus::May
                };
            }
        }

        record
    }
}

impl fmt::Display for LabelFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status of a single label on a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelStatus {
    /// The label is satisfied
    Ok,
    /// The label blocks submission
    Reject,
    /// The label still needs a vote
    Need,
    /// The label may be set but is not required
    May,
    /// The label cannot be satisfied by anyone
    Impossible,
}

impl LabelStatus {
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            LabelStatus::Need | LabelStatus::Reject | LabelStatus::Impossible
        )
    }
}

/// Outcome of applying a label function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub label: String,
    pub status: LabelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_by: Option<AccountId>,
}

/// A vote on a label of the current patch set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub label: String,
    pub account: AccountId,
    pub value: i16,
    pub granted: DateTime<Utc>,
}

impl Approval {
    pub fn new(label: impl Into<String>, account: AccountId, value: i16) -> Self {
        Self {
            label: label.into(),
            account,
            value,
            granted: Utc::now(),
        }
    }
}

/// One allowed value of a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelValue {
    pub value: i16,
    pub text: String,
}

impl LabelValue {
    pub fn new(value: i16, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }
}

/// Rules controlling whether a vote carries forward to a new patch set.
///
/// The set is closed; the wire tokens are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CopyScoreRule {
    #[serde(rename = "copyMinScore")]
    MinScore,
    #[serde(rename = "copyMaxScore")]
    MaxScore,
    #[serde(rename = "copyAllScoresIfNoChange")]
    AllScoresIfNoChange,
    #[serde(rename = "copyAllScoresIfNoCodeChange")]
    AllScoresIfNoCodeChange,
    #[serde(rename = "copyAllScoresOnMergeFirstParentUpdate")]
    AllScoresOnMergeFirstParentUpdate,
    #[serde(rename = "copyAllScoresOnTrivialRebase")]
    AllScoresOnTrivialRebase,
}

impl CopyScoreRule {
    pub const ALL: [CopyScoreRule; 6] = [
        CopyScoreRule::MinScore,
        CopyScoreRule::MaxScore,
        CopyScoreRule::AllScoresIfNoChange,
        CopyScoreRule::AllScoresIfNoCodeChange,
        CopyScoreRule::AllScoresOnMergeFirstParentUpdate,
        CopyScoreRule::AllScoresOnTrivialRebase,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            CopyScoreRule::MinScore => "copyMinScore",
            CopyScoreRule::MaxScore => "copyMaxScore",
            CopyScoreRule::AllScoresIfNoChange => "copyAllScoresIfNoChange",
            CopyScoreRule::AllScoresIfNoCodeChange => "copyAllScoresIfNoCodeChange",
            CopyScoreRule::AllScoresOnMergeFirstParentUpdate => {
                "copyAllScoresOnMergeFirstParentUpdate"
            }
            CopyScoreRule::AllScoresOnTrivialRebase => "copyAllScoresOnTrivialRebase",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.token() == token)
    }
}

impl fmt::Display for CopyScoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

fn default_true() -> bool {
    true
}

/// A label as persisted in a project config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelType {
    pub name: String,

    #[serde(default)]
    pub function: LabelFunction,

    pub values: Vec<LabelValue>,

    /// Refs this label applies to (empty = all refs)
    #[serde(default)]
    pub ref_patterns: Vec<String>,

    /// Whether child projects may redefine this label
    #[serde(default = "default_true")]
    pub can_override: bool,

    #[serde(default = "default_true")]
    pub allow_post_submit: bool,

    #[serde(default)]
    pub ignore_self_approval: bool,

    #[serde(default)]
    pub copy_min_score: bool,
    #[serde(default)]
    pub copy_max_score: bool,
    #[serde(default)]
    pub copy_all_scores_if_no_change: bool,
    #[serde(default)]
    pub copy_all_scores_if_no_code_change: bool,
    #[serde(default)]
    pub copy_all_scores_on_merge_first_parent_update: bool,
    #[serde(default)]
    pub copy_all_scores_on_trivial_rebase: bool,
}

impl LabelType {
    pub fn new(name: impl Into<String>, values: Vec<LabelValue>) -> Self {
        Self {
            name: name.into(),
            function: LabelFunction::MaxWithBlock,
            values,
            ref_patterns: Vec::new(),
            can_override: true,
            allow_post_submit: true,
            ignore_self_approval: false,
            copy_min_score: false,
            copy_max_score: false,
            copy_all_scores_if_no_change: false,
            copy_all_scores_if_no_code_change: false,
            copy_all_scores_on_merge_first_parent_update: false,
            copy_all_scores_on_trivial_rebase: false,
        }
    }

    /// A -1..+1 label
    pub fn with_default_values(name: impl Into<String>) -> Self {
        Self::new(
            name,
            vec![
                LabelValue::new(-1, "Rejected"),
                LabelValue::new(0, "No score"),
                LabelValue::new(1, "Approved"),
            ],
        )
    }

    /// The stock -2..+2 review label
    pub fn code_review() -> Self {
        Self::new(
            "Code-Review",
            vec![
                LabelValue::new(-2, "This shall not be merged"),
                LabelValue::new(-1, "I would prefer this is not merged as is"),
                LabelValue::new(0, "No score"),
                LabelValue::new(1, "Looks good to me, but someone else must approve"),
                LabelValue::new(2, "Looks good to me, approved"),
            ],
        )
    }

    pub fn with_function(mut self, function: LabelFunction) -> Self {
        self.function = function;
        self
    }

    pub fn with_can_override(mut self, can_override: bool) -> Self {
        self.can_override = can_override;
        self
    }

    pub fn max_value(&self) -> i16 {
        self.values.iter().map(|v| v.value).max().unwrap_or(0)
    }

    pub fn min_value(&self) -> i16 {
        self.values.iter().map(|v| v.value).min().unwrap_or(0)
    }

    pub fn is_max_positive(&self, value: i16) -> bool {
        let max = self.max_value();
        max > 0 && value == max
    }

    pub fn is_max_negative(&self, value: i16) -> bool {
        let min = self.min_value();
        min < 0 && value == min
    }

    pub fn copy_score(&self, rule: CopyScoreRule) -> bool {
        match rule {
            CopyScoreRule::MinScore => self.copy_min_score,
            CopyScoreRule::MaxScore => self.copy_max_score,
            CopyScoreRule::AllScoresIfNoChange => self.copy_all_scores_if_no_change,
            CopyScoreRule::AllScoresIfNoCodeChange => self.copy_all_scores_if_no_code_change,
            CopyScoreRule::AllScoresOnMergeFirstParentUpdate => {
                self.copy_all_scores_on_merge_first_parent_update
            }
            CopyScoreRule::AllScoresOnTrivialRebase => self.copy_all_scores_on_trivial_rebase,
        }
    }

    pub fn set_copy_score(&mut self, rule: CopyScoreRule, enabled: bool) {
        let flag = match rule {
            CopyScoreRule::MinScore => &mut self.copy_min_score,
            CopyScoreRule::MaxScore => &mut self.copy_max_score,
            CopyScoreRule::AllScoresIfNoChange => &mut self.copy_all_scores_if_no_change,
            CopyScoreRule::AllScoresIfNoCodeChange => &mut self.copy_all_scores_if_no_code_change,
            CopyScoreRule::AllScoresOnMergeFirstParentUpdate => {
                &mut self.copy_all_scores_on_merge_first_parent_update
            }
            CopyScoreRule::AllScoresOnTrivialRebase => &mut self.copy_all_scores_on_trivial_rebase,
        };
        *flag = enabled;
    }
}
