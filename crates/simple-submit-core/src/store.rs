//! Project configuration storage
//!
//! [`ProjectStore`] is the boundary to the host's versioned configuration
//! store. Writers go through a scoped [`ProjectEdit`]: open it, mutate the
//! snapshot, and hand it back to [`ProjectStore::commit`] exactly once.
//! Dropping an edit without committing discards it; nothing reaches the
//! store.
//!
//! [`InMemoryProjectStore`] keeps everything in process memory and detects
//! concurrent writers by comparing content revisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};

use crate::error::{Result, SubmitRulesError};
use crate::project::{ProjectConfig, ProjectState};

/// Deepest parent chain followed before giving up
const MAX_INHERITANCE_DEPTH: usize = 64;

/// One committed version of a project config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionInfo {
    pub revision: String,
    pub author: String,
    pub message: String,
    pub committed_at: DateTime<Utc>,
}

/// A mutable snapshot of one project's own config
#[derive(Debug)]
pub struct ProjectEdit {
    project: String,
    author: String,
    base_revision: String,
    config: ProjectConfig,
}

impl ProjectEdit {
    pub fn new(
        project: impl Into<String>,
        author: impl Into<String>,
        base_revision: impl Into<String>,
        config: ProjectConfig,
    ) -> Self {
        Self {
            project: project.into(),
            author: author.into(),
            base_revision: base_revision.into(),
            config,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Revision the snapshot was taken from
    pub fn base_revision(&self) -> &str {
        &self.base_revision
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ProjectConfig {
        &mut self.config
    }

    pub fn into_config(self) -> ProjectConfig {
        self.config
    }
}

/// Host storage of project configs
pub trait ProjectStore: Send + Sync {
    /// Load a project with its ancestors. Implementations may cache.
    fn project_state(&self, project: &str) -> Result<ProjectState>;

    /// Take a snapshot of the project's own config for editing
    fn open_edit(&self, project: &str, author: &str) -> Result<ProjectEdit>;

    /// Persist an edit atomically
    fn commit(&self, edit: ProjectEdit, message: &str) -> Result<RevisionInfo>;

    /// Drop cached views of `project` and of everything inheriting from it
    fn evict(&self, project: &str);
}

/// Content revision of a config
pub fn revision_of(config: &ProjectConfig) -> Result<String> {
    let bytes = serde_json::to_vec(config)
        .map_err(|e| SubmitRulesError::storage(format!("cannot serialize project config: {}", e)))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

#[derive(Debug, Clone)]
struct StoredProject {
    config: ProjectConfig,
    revision: String,
    history: Vec<RevisionInfo>,
}

/// Volatile [`ProjectStore`] for tests and single-node deployments
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: RwLock<BTreeMap<String, StoredProject>>,
    cache: Mutex<HashMap<String, ProjectState>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a list of configs
    pub fn with_projects(projects: impl IntoIterator<Item = ProjectConfig>) -> Result<Self> {
        let store = Self::new();
        for config in projects {
            store.insert(config)?;
        }
        Ok(store)
    }

    /// Create or replace a project without going through an edit
    pub fn insert(&self, config: ProjectConfig) -> Result<()> {
        let revision = revision_of(&config)?;
        let name = config.name.clone();
        let mut projects = self.write_projects()?;
        projects.insert(
            name.clone(),
            StoredProject {
                config,
                revision,
                history: Vec::new(),
            },
        );
        drop(projects);
        self.evict(&name);
        Ok(())
    }

    /// Commits made to `project`, oldest first
    pub fn history(&self, project: &str) -> Result<Vec<RevisionInfo>> {
        let projects = self.read_projects()?;
        projects
            .get(project)
            .map(|p| p.history.clone())
            .ok_or_else(|| not_found(project))
    }

    pub fn revision(&self, project: &str) -> Result<String> {
        let projects = self.read_projects()?;
        projects
            .get(project)
            .map(|p| p.revision.clone())
            .ok_or_else(|| not_found(project))
    }

    fn read_projects(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, StoredProject>>> {
        self.projects
            .read()
            .map_err(|_| SubmitRulesError::storage("project store lock poisoned"))
    }

    fn write_projects(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, StoredProject>>> {
        self.projects
            .write()
            .map_err(|_| SubmitRulesError::storage("project store lock poisoned"))
    }

    fn resolve(&self, project: &str) -> Result<ProjectState> {
        let projects = self.read_projects()?;
        let mut chain = Vec::new();
        let mut next = Some(project.to_string());

        while let Some(name) = next {
            if chain.len() >= MAX_INHERITANCE_DEPTH {
                return Err(SubmitRulesError::storage(format!(
                    "inheritance chain of {} is too deep",
                    project
                )));
            }
            let stored = match projects.get(&name) {
                Some(stored) => stored,
                None if chain.is_empty() => return Err(not_found(project)),
                None => {
                    tracing::warn!(project, parent = %name, "parent project is missing");
                    break;
                }
            };
            if chain.iter().any(|c: &ProjectConfig| c.name == name) {
                return Err(SubmitRulesError::storage(format!(
                    "inheritance cycle at {}",
                    name
                )));
            }
            next = stored.config.parent.clone();
            chain.push(stored.config.clone());
        }

        Ok(ProjectState::new(chain))
    }
}

fn not_found(project: &str) -> SubmitRulesError {
    SubmitRulesError::NotFound(format!("project {} does not exist", project))
}

impl ProjectStore for InMemoryProjectStore {
    fn project_state(&self, project: &str) -> Result<ProjectState> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(state) = cache.get(project) {
                return Ok(state.clone());
            }
        }

        let state = self.resolve(project)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(project.to_string(), state.clone());
        }
        Ok(state)
    }

    fn open_edit(&self, project: &str, author: &str) -> Result<ProjectEdit> {
        let projects = self.read_projects()?;
        let stored = projects.get(project).ok_or_else(|| not_found(project))?;
        Ok(ProjectEdit::new(
            project,
            author,
            stored.revision.clone(),
            stored.config.clone(),
        ))
    }

    fn commit(&self, edit: ProjectEdit, message: &str) -> Result<RevisionInfo> {
        let mut projects = self.write_projects()?;
        let stored = projects
            .get_mut(edit.project())
            .ok_or_else(|| not_found(edit.project()))?;

        if stored.revision != edit.base_revision() {
            return Err(SubmitRulesError::Conflict(format!(
                "project {} changed since revision {}",
                edit.project(),
                edit.base_revision()
            )));
        }

        let author = edit.author().to_string();
        let config = edit.into_config();
        let revision = revision_of(&config)?;
        let info = RevisionInfo {
            revision: revision.clone(),
            author,
            message: message.to_string(),
            committed_at: Utc::now(),
        };

        stored.config = config;
        stored.revision = revision;
        stored.history.push(info.clone());

        tracing::debug!(project = %stored.config.name, revision = %info.revision, "committed project config");
        Ok(info)
    }

    fn evict(&self, project: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.retain(|_, state| {
                state.name() != project && !state.ancestors().any(|a| a.name == project)
            });
        }
    }
}
