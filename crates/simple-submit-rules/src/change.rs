//! Change data seen by submit rules

use simple_submit_core::{AccountId, Approval, Result, SubmitRulesError};

/// Read access to a change under review. Every lookup may hit storage and
/// fail independently.
pub trait ChangeData: Send + Sync {
    fn change_id(&self) -> &str;

    /// Name of the project the change belongs to
    fn project(&self) -> &str;

    /// Account that uploaded the change
    fn owner(&self) -> Result<AccountId>;

    /// Votes on the current patch set, all labels
    fn current_approvals(&self) -> Result<Vec<Approval>>;

    /// `Ok(None)` when the count is unknown
    fn unresolved_comment_count(&self) -> Result<Option<u32>>;
}

/// Lookup that an [`InMemoryChange`] fails on purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeLookup {
    Owner,
    Approvals,
    UnresolvedComments,
}

/// A change held in memory
#[derive(Debug, Clone)]
pub struct InMemoryChange {
    change_id: String,
    project: String,
    owner: AccountId,
    approvals: Vec<Approval>,
    unresolved_comments: Option<u32>,
    failing: Vec<ChangeLookup>,
}

impl InMemoryChange {
    pub fn new(change_id: impl Into<String>, project: impl Into<String>, owner: AccountId) -> Self {
        Self {
            change_id: change_id.into(),
            project: project.into(),
            owner,
            approvals: Vec::new(),
            unresolved_comments: Some(0),
            failing: Vec::new(),
        }
    }

    /// Record a vote on the current patch set
    pub fn with_vote(mut self, label: &str, account: AccountId, value: i16) -> Self {
        self.approvals.push(Approval::new(label, account, value));
        self
    }

    pub fn with_unresolved_comments(mut self, count: Option<u32>) -> Self {
        self.unresolved_comments = count;
        self
    }

    /// Make `lookup` return a storage error
    pub fn failing(mut self, lookup: ChangeLookup) -> Self {
        self.failing.push(lookup);
        self
    }

    fn check(&self, lookup: ChangeLookup) -> Result<()> {
        if self.failing.contains(&lookup) {
            return Err(SubmitRulesError::storage(format!(
                "{:?} unavailable for change {}",
                lookup, self.change_id
            )));
        }
        Ok(())
    }
}

impl ChangeData for InMemoryChange {
    fn change_id(&self) -> &str {
        &self.change_id
    }

    fn project(&self) -> &str {
        &self.project
    }

    fn owner(&self) -> Result<AccountId> {
        self.check(ChangeLookup::Owner)?;
        Ok(self.owner)
    }

    fn current_approvals(&self) -> Result<Vec<Approval>> {
        self.check(ChangeLookup::Approvals)?;
        Ok(self.approvals.clone())
    }

    fn unresolved_comment_count(&self) -> Result<Option<u32>> {
        self.check(ChangeLookup::UnresolvedComments)?;
        Ok(self.unresolved_comments)
    }
}
