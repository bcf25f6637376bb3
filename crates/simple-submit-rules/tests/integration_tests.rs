//! End to end tests: configure a project through the translator, then
//! evaluate changes against it with the standard rule set.

use simple_submit_core::{
    AccountId, CommentsRules, ConfigTranslator, InMemoryProjectStore, LabelDefinition,
    PluginContext, ProjectConfig, ProjectStore, SubmitConfig, DEFAULT_PLUGIN_NAME,
    KEY_REQUIRE_NON_AUTHOR_APPROVAL,
};
use simple_submit_rules::{
    standard_registry, InMemoryChange, SubmitRequirementInfo, SubmitStatus,
};

/// Path to the project fixture relative to the workspace root
const PROJECTS_PATH: &str = "testing/fixtures/projects.yaml";

const PROJECT: &str = "plugins/simple";
const AUTHOR: AccountId = AccountId(1000);
const ADMIN: AccountId = AccountId(1);
const CI: AccountId = AccountId(2);

fn store() -> InMemoryProjectStore {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    let raw = std::fs::read_to_string(workspace_root.join(PROJECTS_PATH)).unwrap();
    let projects: Vec<ProjectConfig> = serde_yaml::from_str(&raw).unwrap();
    InMemoryProjectStore::with_projects(projects).unwrap()
}

fn configure(store: &InMemoryProjectStore, input: &SubmitConfig) {
    let plugin = PluginContext::default();
    let translator = ConfigTranslator::new(&plugin);
    let state = store.project_state(PROJECT).unwrap();
    let mut edit = store.open_edit(PROJECT, "admin").unwrap();
    translator.write(&state, edit.config_mut(), input).unwrap();
    store.commit(edit, "Update simple submit rules").unwrap();
    store.evict(PROJECT);
}

/// A change by AUTHOR that CI verified
fn change() -> InMemoryChange {
    InMemoryChange::new("I42", PROJECT, AUTHOR).with_vote("Verified", CI, 1)
}

#[test]
fn test_unresolved_comment_blocks_approved_change() {
    let store = store();
    let input: SubmitConfig = serde_json::from_str(
        r#"{"labels": null, "comments": {"block_if_unresolved_comments": true}}"#,
    )
    .unwrap();
    configure(&store, &input);

    let change = change()
        .with_vote("Code-Review", ADMIN, 2)
        .with_unresolved_comments(Some(1));
    let summary = standard_registry(DEFAULT_PLUGIN_NAME).summarize(&change, &store);

    assert!(!summary.submittable);
    assert_eq!(
        summary.requirements,
        vec![SubmitRequirementInfo {
            status: SubmitStatus::NotReady,
            fallback_text: "Resolve all comments".to_string(),
            type_: "unresolved_comments".to_string(),
        }]
    );
}

#[test]
fn test_resolving_comments_makes_change_submittable() {
    let store = store();
    configure(&store, &SubmitConfig::new().with_comments(CommentsRules::new(true)));

    let change = change()
        .with_vote("Code-Review", ADMIN, 2)
        .with_unresolved_comments(Some(0));
    let summary = standard_registry(DEFAULT_PLUGIN_NAME).summarize(&change, &store);

    assert!(summary.submittable);
    assert_eq!(summary.requirements.len(), 1);
    assert_eq!(summary.requirements[0].status, SubmitStatus::Ok);
}

#[test]
fn test_ignored_self_approval_is_not_submittable() {
    let store = store();
    configure(
        &store,
        &SubmitConfig::new().with_label(
            "Code-Review",
            LabelDefinition::new()
                .with_function("MaxWithBlock")
                .ignore_self_approval(true),
        ),
    );

    let change = change().with_vote("Code-Review", AUTHOR, 2);
    let summary = standard_registry(DEFAULT_PLUGIN_NAME).summarize(&change, &store);
    assert!(!summary.submittable);

    // another reviewer's approval is enough
    let change = change.with_vote("Code-Review", ADMIN, 2);
    assert!(standard_registry(DEFAULT_PLUGIN_NAME).summarize(&change, &store).submittable);
}

#[test]
fn test_non_author_approval_required() {
    let store = store();
    let mut edit = store.open_edit(PROJECT, "admin").unwrap();
    edit.config_mut()
        .section_mut("Code-Review")
        .set_boolean(KEY_REQUIRE_NON_AUTHOR_APPROVAL, true);
    store.commit(edit, "Require non-author approval").unwrap();
    store.evict(PROJECT);
    let registry = standard_registry(DEFAULT_PLUGIN_NAME);

    let change = change().with_vote("Code-Review", AUTHOR, 2);
    let records = registry.evaluate(&change, &store);
    let gate = records
        .iter()
        .find(|r| r.rule_name.as_deref() == Some("simple-submit-rules~RequireNonAuthorApprovalRule"))
        .unwrap();
    assert_eq!(gate.status, SubmitStatus::NotReady);
    assert!(!registry.summarize(&change, &store).submittable);

    // a non-author vote withdraws the gate's verdict
    let change = change.with_vote("Code-Review", ADMIN, 2);
    let records = registry.evaluate(&change, &store);
    assert!(records
        .iter()
        .all(|r| r.rule_name.as_deref() != Some("simple-submit-rules~RequireNonAuthorApprovalRule")));
    assert!(registry.summarize(&change, &store).submittable);
}

#[test]
fn test_author_veto_blocks_even_with_approval() {
    let store = store();
    let mut edit = store.open_edit(PROJECT, "admin").unwrap();
    edit.config_mut()
        .section_mut("Code-Review")
        .set_boolean(KEY_REQUIRE_NON_AUTHOR_APPROVAL, true);
    store.commit(edit, "Require non-author approval").unwrap();
    store.evict(PROJECT);

    let change = change()
        .with_vote("Code-Review", AUTHOR, -2)
        .with_vote("Code-Review", ADMIN, 2);
    let summary = standard_registry(DEFAULT_PLUGIN_NAME).summarize(&change, &store);
    assert!(!summary.submittable);
}

#[test]
fn test_unknown_project_fails_every_rule() {
    let store = store();
    let change = InMemoryChange::new("I1", "does/not/exist", AUTHOR);
    let summary = standard_registry(DEFAULT_PLUGIN_NAME).summarize(&change, &store);

    assert!(!summary.submittable);
    assert_eq!(summary.records.len(), 3);
    assert_eq!(summary.errors().count(), 3);
}
