//! Server configuration
//!
//! Loaded from the YAML file named by `SIMPLE_SUBMIT_CONFIG`. The listen
//! address can be overridden with `SIMPLE_SUBMIT_ADDR`.

use serde::{Deserialize, Serialize};
use simple_submit_core::{
    PluginConfig, PluginContext, ProjectConfig, StaticPermissionBackend, DEFAULT_PLUGIN_NAME,
};
use std::path::Path;

use crate::error::ServerError;

pub const CONFIG_PATH_ENV: &str = "SIMPLE_SUBMIT_CONFIG";
pub const LISTEN_ADDR_ENV: &str = "SIMPLE_SUBMIT_ADDR";

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_plugin_name() -> String {
    DEFAULT_PLUGIN_NAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Name the plugin's settings are stored under
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,

    /// Host-level plugin settings, holding the deny lists
    #[serde(default)]
    pub plugin: PluginConfig,

    /// Projects the in-memory store starts with
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,

    /// user → project (or `*`) → permissions
    #[serde(default)]
    pub grants: StaticPermissionBackend,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            plugin_name: default_plugin_name(),
            plugin: PluginConfig::new(),
            projects: Vec::new(),
            grants: StaticPermissionBackend::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, ServerError> {
        serde_yaml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&raw)
    }

    /// Config file from the environment, or defaults when none is named
    pub fn from_env() -> Result<Self, ServerError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => {
                tracing::warn!("{} not set, starting without projects", CONFIG_PATH_ENV);
                Self::default()
            }
        };
        if let Ok(addr) = std::env::var(LISTEN_ADDR_ENV) {
            config.listen_addr = addr;
        }
        Ok(config)
    }

    pub fn plugin_context(&self) -> PluginContext {
        PluginContext::new(self.plugin_name.clone(), self.plugin.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_yaml("{}").unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.plugin_name, "simple-submit-rules");
        assert!(config.projects.is_empty());
    }

    #[test]
    fn test_deny_lists_reach_plugin_context() {
        let config = ServerConfig::from_yaml(
            r#"
plugin:
  disallowedLabelFunctions-Code-Review: [NoOp]
"#,
        )
        .unwrap();
        let plugin = config.plugin_context();
        assert_eq!(plugin.disallowed_label_functions("Code-Review"), ["NoOp".to_string()]);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            ServerConfig::from_yaml("projects: 7"),
            Err(ServerError::Config(_))
        ));
    }
}
