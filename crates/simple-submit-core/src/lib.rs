//! Simple Submit Rules Core: configuration document, host project model,
//! and the translator between them
//!
//! # Architecture
//!
//! ```text
//! SubmitConfig (wire) ──write──▶ ConfigTranslator ──▶ ProjectEdit ──commit──▶ ProjectStore
//!        ▲                                                                       │
//!        └───────────────read──── ConfigTranslator ◀── ProjectState ◀────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use simple_submit_core::{
//!     ConfigTranslator, InMemoryProjectStore, LabelDefinition, LabelType, PluginContext,
//!     ProjectConfig, ProjectStore, SubmitConfig,
//! };
//!
//! let store = InMemoryProjectStore::with_projects([
//!     ProjectConfig::new("All-Projects").with_label(LabelType::code_review()),
//!     ProjectConfig::new("demo").with_parent("All-Projects"),
//! ])
//! .unwrap();
//!
//! let plugin = PluginContext::default();
//! let translator = ConfigTranslator::new(&plugin);
//!
//! let state = store.project_state("demo").unwrap();
//! let mut edit = store.open_edit("demo", "admin").unwrap();
//! let input = SubmitConfig::new()
//!     .with_label("Code-Review", LabelDefinition::new().with_function("MaxNoBlock"));
//! translator.write(&state, edit.config_mut(), &input).unwrap();
//! store.commit(edit, "Update simple submit rules").unwrap();
//! store.evict("demo");
//!
//! let config = translator.read(&store.project_state("demo").unwrap());
//! assert_eq!(
//!     config.label("Code-Review").unwrap().function.as_deref(),
//!     Some("MaxNoBlock")
//! );
//! ```

pub mod context;
pub mod data_model;
pub mod error;
pub mod label;
pub mod permission;
pub mod project;
pub mod store;
pub mod translator;

pub use context::{
    PluginContext, RequestContext, DEFAULT_PLUGIN_NAME, KEY_BLOCK_IF_UNRESOLVED_COMMENTS,
    KEY_REQUIRE_NON_AUTHOR_APPROVAL,
};
pub use data_model::{CommentsRules, LabelDefinition, SubmitConfig};
pub use error::{Result, SubmitRulesError};
pub use label::{
    AccountId, Approval, CopyScoreRule, LabelFunction, LabelRecord, LabelStatus, LabelType,
    LabelValue,
};
pub use permission::{PermissionBackend, ProjectPermission, StaticPermissionBackend};
pub use project::{PluginConfig, ProjectConfig, ProjectState};
pub use store::{InMemoryProjectStore, ProjectEdit, ProjectStore, RevisionInfo};
pub use translator::ConfigTranslator;
