//! Simple Submit Rules: submit gates driven by project configuration
//!
//! # Architecture
//!
//! ```text
//! ChangeData ─┐
//!             ├─▶ SubmitRuleRegistry ──▶ DefaultLabelRule ──────────────┐
//! ProjectStore┘        (one ProjectState)  RequireNonAuthorApprovalRule ├─▶ SubmitSummary
//!                                          NoUnresolvedCommentsRule ─────┘
//! ```
//!
//! # Example
//!
//! ```
//! use simple_submit_core::{AccountId, InMemoryProjectStore, LabelType, ProjectConfig};
//! use simple_submit_rules::{standard_registry, InMemoryChange};
//!
//! let store = InMemoryProjectStore::with_projects([
//!     ProjectConfig::new("demo").with_label(LabelType::code_review()),
//! ])
//! .unwrap();
//!
//! let change = InMemoryChange::new("42", "demo", AccountId(1))
//!     .with_vote("Code-Review", AccountId(2), 2);
//!
//! let summary = standard_registry("simple-submit-rules").summarize(&change, &store);
//! assert!(summary.submittable);
//! ```

pub mod change;
pub mod default_rule;
pub mod non_author;
pub mod rule;
pub mod unresolved_comments;
pub mod verdict;

pub use change::{ChangeData, ChangeLookup, InMemoryChange};
pub use default_rule::DefaultLabelRule;
pub use non_author::RequireNonAuthorApprovalRule;
pub use rule::{SubmitRule, SubmitRuleRegistry};
pub use unresolved_comments::NoUnresolvedCommentsRule;
pub use verdict::{
    SubmitRecord, SubmitRequirement, SubmitRequirementInfo, SubmitStatus, SubmitSummary,
    UNRESOLVED_COMMENTS_REQUIREMENT, UNRESOLVED_COMMENTS_TYPE,
};

/// The host default rule plus both plugin rules, reading plugin settings
/// stored under `plugin_name`
pub fn standard_registry(plugin_name: &str) -> SubmitRuleRegistry {
    SubmitRuleRegistry::new()
        .register("default", DefaultLabelRule)
        .register(
            format!("{}~RequireNonAuthorApprovalRule", plugin_name),
            RequireNonAuthorApprovalRule::new(),
        )
        .register(
            format!("{}~NoUnresolvedCommentsRule", plugin_name),
            NoUnresolvedCommentsRule::new(plugin_name),
        )
}
