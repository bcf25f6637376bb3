//! Project permission checks
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SubmitRulesError};

/// Grants matching every project
pub const ALL_PROJECTS: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectPermission {
    ReadConfig,
    WriteConfig,
}

impl ProjectPermission {
    pub fn describe(&self) -> &'static str {
        match self {
            ProjectPermission::ReadConfig => "read config",
            ProjectPermission::WriteConfig => "write config",
        }
    }
}

/// Host permission subsystem
pub trait PermissionBackend: Send + Sync {
    /// `Err(Auth)` when `user` may not exercise `permission` on `project`
    fn check(&self, user: Option<&str>, project: &str, permission: ProjectPermission) -> Result<()>;
}

/// Permission grants held in memory: user → project (or `*`) → permissions.
///
/// Write access implies read access. Anonymous users hold nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticPermissionBackend {
    grants: BTreeMap<String, BTreeMap<String, BTreeSet<ProjectPermission>>>,
}

impl StaticPermissionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, user: &str, project: &str, permission: ProjectPermission) -> Self {
        self.grants
            .entry(user.to_string())
            .or_default()
            .entry(project.to_string())
            .or_default()
            .insert(permission);
        self
    }

    fn holds(&self, user: &str, project: &str, permission: ProjectPermission) -> bool {
        let Some(projects) = self.grants.get(user) else {
            return false;
        };
        [project, ALL_PROJECTS]
            .iter()
            .filter_map(|p| projects.get(*p))
            .any(|perms| {
                perms.contains(&permission)
                    || (permission == ProjectPermission::ReadConfig
                        && perms.contains(&ProjectPermission::WriteConfig))
            })
    }
}

impl PermissionBackend for StaticPermissionBackend {
    fn check(&self, user: Option<&str>, project: &str, permission: ProjectPermission) -> Result<()> {
        match user {
            Some(user) if self.holds(user, project, permission) => Ok(()),
            _ => Err(SubmitRulesError::Auth(format!(
                "{} not permitted for {}",
                permission.describe(),
                project
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_and_implied_read() {
        let backend = StaticPermissionBackend::new()
            .grant("admin", ALL_PROJECTS, ProjectPermission::WriteConfig)
            .grant("user", "plugins/foo", ProjectPermission::ReadConfig);

        assert!(backend.check(Some("admin"), "any", ProjectPermission::ReadConfig).is_ok());
        assert!(backend.check(Some("admin"), "any", ProjectPermission::WriteConfig).is_ok());
        assert!(backend.check(Some("user"), "plugins/foo", ProjectPermission::ReadConfig).is_ok());
        assert!(backend.check(Some("user"), "plugins/foo", ProjectPermission::WriteConfig).is_err());
        assert!(backend.check(Some("user"), "other", ProjectPermission::ReadConfig).is_err());
    }

    #[test]
    fn test_anonymous_denied() {
        let backend = StaticPermissionBackend::new();
        let err = backend
            .check(None, "plugins/foo", ProjectPermission::ReadConfig)
            .unwrap_err();
        assert_eq!(err.to_string(), "AUTH/read config not permitted for plugins/foo");
    }
}
