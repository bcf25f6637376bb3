//! Project configuration and inheritance
//!
//! A [`ProjectConfig`] is what one project stores for itself: its own label
//! sections, plugin-scoped settings and legacy per-section settings. A
//! [`ProjectState`] is the resolved view of a project together with all of
//! its ancestors, root last, which is what readers use to see inherited
//! values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::label::LabelType;

/// Key/value settings owned by one plugin. Every key holds a list of string
/// values; scalar getters read the first value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig {
    entries: BTreeMap<String, Vec<String>>,
}

impl PluginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_string_list(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Unparseable values read as `default`
    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        self.get_string(key)
            .and_then(parse_bool)
            .unwrap_or(default)
    }

    pub fn set_boolean(&mut self, key: &str, value: bool) {
        self.entries
            .insert(key.to_string(), vec![value.to_string()]);
    }

    pub fn set_string_list(&mut self, key: &str, values: Vec<String>) {
        self.entries.insert(key.to_string(), values);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer `child` on top of `self`: keys set by the child win.
    fn overlay(&mut self, child: &PluginConfig) {
        for (key, values) in &child.entries {
            self.entries.insert(key.clone(), values.clone());
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// The settings of a single project, without anything inherited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,

    /// `None` only for the root project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Locally defined label sections, keyed by label name
    #[serde(default)]
    pub labels: BTreeMap<String, LabelType>,

    /// Plugin-scoped settings, keyed by plugin name
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginConfig>,

    /// Legacy settings, keyed by section name. Label specific settings live
    /// in the section named after the label.
    #[serde(default)]
    pub sections: BTreeMap<String, PluginConfig>,
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            labels: BTreeMap::new(),
            plugins: BTreeMap::new(),
            sections: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_label(mut self, label: LabelType) -> Self {
        self.labels.insert(label.name.clone(), label);
        self
    }

    pub fn with_section_flag(mut self, section: &str, key: &str, value: bool) -> Self {
        self.section_mut(section).set_boolean(key, value);
        self
    }

    pub fn with_plugin_flag(mut self, plugin: &str, key: &str, value: bool) -> Self {
        self.plugin_config_mut(plugin).set_boolean(key, value);
        self
    }

    /// Plugin settings of this project only
    pub fn plugin_config(&self, plugin: &str) -> PluginConfig {
        self.plugins.get(plugin).cloned().unwrap_or_default()
    }

    pub fn plugin_config_mut(&mut self, plugin: &str) -> &mut PluginConfig {
        self.plugins.entry(plugin.to_string()).or_default()
    }

    pub fn section_mut(&mut self, section: &str) -> &mut PluginConfig {
        self.sections.entry(section.to_string()).or_default()
    }
}

/// A project resolved together with its ancestors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectState {
    /// The project itself first, the root project last
    chain: Vec<ProjectConfig>,
}

impl ProjectState {
    /// `chain` must start with the project and end with the root
    pub fn new(chain: Vec<ProjectConfig>) -> Self {
        Self { chain }
    }

    /// A project without ancestors
    pub fn standalone(config: ProjectConfig) -> Self {
        Self {
            chain: vec![config],
        }
    }

    pub fn name(&self) -> &str {
        self.chain.first().map(|c| c.name.as_str()).unwrap_or("")
    }

    /// The project's own config
    pub fn config(&self) -> Option<&ProjectConfig> {
        self.chain.first()
    }

    pub fn ancestors(&self) -> impl Iterator<Item = &ProjectConfig> {
        self.chain.iter().skip(1)
    }

    /// The same ancestors with `config` as the project's own config
    pub fn with_own_config(&self, config: ProjectConfig) -> ProjectState {
        let mut chain = Vec::with_capacity(self.chain.len().max(1));
        chain.push(config);
        chain.extend(self.ancestors().cloned());
        ProjectState { chain }
    }

    /// Labels visible to the project, parents first.
    ///
    /// A child definition replaces the inherited one only when the inherited
    /// label allows overriding.
    pub fn label_types(&self) -> Vec<LabelType> {
        let mut resolved: Vec<LabelType> = Vec::new();
        for config in self.chain.iter().rev() {
            for label in config.labels.values() {
                match resolved.iter_mut().find(|l| l.name == label.name) {
                    Some(existing) if existing.can_override => *existing = label.clone(),
                    Some(_) => {}
                    None => resolved.push(label.clone()),
                }
            }
        }
        resolved
    }

    pub fn label_type(&self, name: &str) -> Option<LabelType> {
        self.label_types().into_iter().find(|l| l.name == name)
    }

    /// Plugin settings with values inherited from ancestors
    pub fn plugin_config_with_inheritance(&self, plugin: &str) -> PluginConfig {
        let mut merged = PluginConfig::new();
        for config in self.chain.iter().rev() {
            if let Some(own) = config.plugins.get(plugin) {
                merged.overlay(own);
            }
        }
        merged
    }

    /// Legacy section with values inherited from ancestors
    pub fn section_with_inheritance(&self, section: &str) -> PluginConfig {
        let mut merged = PluginConfig::new();
        for config in self.chain.iter().rev() {
            if let Some(own) = config.sections.get(section) {
                merged.overlay(own);
            }
        }
        merged
    }
}
