//! Request-scoped context: who is calling, and the host-level plugin settings
use crate::project::PluginConfig;

/// Name the plugin registers under unless configured otherwise
pub const DEFAULT_PLUGIN_NAME: &str = "simple-submit-rules";

/// Plugin-scoped key holding the unresolved comments gate
pub const KEY_BLOCK_IF_UNRESOLVED_COMMENTS: &str = "blockIfUnresolvedComments";

/// Legacy per-label key enabling the non-author approval gate
pub const KEY_REQUIRE_NON_AUTHOR_APPROVAL: &str = "nonAuthorApprovalRequired";

/// Plugin name and host-level settings, resolved once per request
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub plugin_name: String,
    /// Host-wide plugin settings (deny lists)
    pub host_config: PluginConfig,
}

impl PluginContext {
    pub fn new(plugin_name: impl Into<String>, host_config: PluginConfig) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            host_config,
        }
    }

    /// Function names that may not be set on `label`
    pub fn disallowed_label_functions(&self, label: &str) -> &[String] {
        self.host_config
            .get_string_list(&format!("disallowedLabelFunctions-{}", label))
    }

    /// Copy-score tokens that may not be set on `label`
    pub fn disallowed_copy_score_rules(&self, label: &str) -> &[String] {
        self.host_config
            .get_string_list(&format!("disallowedCopyScoreRules-{}", label))
    }
}

impl Default for PluginContext {
    fn default() -> Self {
        Self::new(DEFAULT_PLUGIN_NAME, PluginConfig::new())
    }
}

/// Identity and tracing data of one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// `None` for anonymous callers
    pub user: Option<String>,
    pub trace_id: String,
}

impl RequestContext {
    pub fn new(user: Option<String>) -> Self {
        Self {
            user,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn user_name(&self) -> &str {
        self.user.as_deref().unwrap_or("anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_lists_are_keyed_by_label() {
        let mut host = PluginConfig::new();
        host.set_string_list(
            "disallowedLabelFunctions-Code-Review",
            vec!["NoOp".to_string(), "NoBlock".to_string()],
        );
        let ctx = PluginContext::new(DEFAULT_PLUGIN_NAME, host);

        assert_eq!(ctx.disallowed_label_functions("Code-Review").len(), 2);
        assert!(ctx.disallowed_label_functions("Verified").is_empty());
        assert!(ctx.disallowed_copy_score_rules("Code-Review").is_empty());
    }

    #[test]
    fn test_request_context_trace_ids_differ() {
        let a = RequestContext::new(Some("admin".to_string()));
        let b = RequestContext::new(None);
        assert_ne!(a.trace_id, b.trace_id);
        assert_eq!(b.user_name(), "anonymous");
    }
}
