use crate::error::{BlockError, BlockResult};
use crate::link::HostAllowList;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Environment variable holding comma-separated internal hostnames
pub const ENV_INTERNAL_HOSTS: &str = "EDITORJS_INTERNAL_HOSTS";
/// Environment variable overriding the CSS class prefix
pub const ENV_CSS_PREFIX: &str = "EDITORJS_CSS_PREFIX";

pub const DEFAULT_CSS_PREFIX: &str = "editorjs";

/// Rendering configuration supplied by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RenderConfig {
    /// Hosts whose links open in place instead of a new window
    #[serde(default)]
    pub internal_hosts: Vec<String>,
    /// Prefix for generated class names, e.g. `editorjs--paragraph`
    #[serde(default = "default_css_prefix")]
    pub css_prefix: String,
}

fn default_css_prefix() -> String {
    DEFAULT_CSS_PREFIX.to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            internal_hosts: Vec::new(),
            css_prefix: default_css_prefix(),
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.internal_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_css_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.css_prefix = prefix.into();
        self
    }

    /// Parse a YAML configuration document
    pub fn from_yaml(yaml: &str) -> BlockResult<Self> {
        let config: RenderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> BlockResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BlockError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Read configuration from the process environment
    pub fn from_env() -> BlockResult<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_env_with<F>(lookup: F) -> BlockResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(hosts) = lookup(ENV_INTERNAL_HOSTS) {
            config.internal_hosts = hosts
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(prefix) = lookup(ENV_CSS_PREFIX) {
            config.css_prefix = prefix.trim().to_string();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BlockResult<()> {
        static PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = PREFIX_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

        if !re.is_match(&self.css_prefix) {
            return Err(BlockError::InvalidConfig(format!(
                "css prefix '{}' must contain only letters, digits, '-' and '_'",
                self.css_prefix
            )));
        }

        if let Some(bad) = self
            .internal_hosts
            .iter()
            .find(|h| h.trim().is_empty() || h.contains(|c: char| c.is_whitespace() || c == '/'))
        {
            return Err(BlockError::InvalidConfig(format!(
                "internal host '{}' must be a bare hostname",
                bad
            )));
        }

        Ok(())
    }

    pub fn host_allow_list(&self) -> HostAllowList {
        HostAllowList::new(&self.internal_hosts)
    }

    /// Base class for a block type, e.g. `editorjs--url`
    pub fn css_name(&self, block_type: &str) -> String {
        format!("{}--{}", self.css_prefix, block_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert!(config.internal_hosts.is_empty());
        assert_eq!(config.css_name("paragraph"), "editorjs--paragraph");
    }

    #[test]
    fn test_from_yaml() {
        let config = RenderConfig::from_yaml(
            "internalHosts:\n  - localhost\n  - app.example.org\ncssPrefix: cms",
        )
        .unwrap();
        assert_eq!(config.internal_hosts, vec!["localhost", "app.example.org"]);
        assert_eq!(config.css_name("url"), "cms--url");
    }

    #[test]
    fn test_from_yaml_rejects_unknown_keys() {
        let result = RenderConfig::from_yaml("internalHost: localhost");
        assert!(matches!(result, Err(BlockError::YamlError(_))));
    }

    #[test]
    fn test_from_yaml_rejects_unsafe_prefix() {
        let result = RenderConfig::from_yaml("cssPrefix: \"x\\\" onclick=\\\"y\"");
        assert!(matches!(result, Err(BlockError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_env_with() {
        let vars: HashMap<&str, &str> = [
            (ENV_INTERNAL_HOSTS, " localhost, staging.example.org ,,"),
            (ENV_CSS_PREFIX, "site"),
        ]
        .into_iter()
        .collect();
        let config = RenderConfig::from_env_with(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.internal_hosts, vec!["localhost", "staging.example.org"]);
        assert_eq!(config.css_prefix, "site");
    }

    #[test]
    fn test_from_env_with_nothing_set() {
        let config = RenderConfig::from_env_with(|_| None).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_rejects_host_with_path() {
        let config = RenderConfig::new().with_internal_hosts(["example.com/app"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_host_allow_list() {
        let config = RenderConfig::new().with_internal_hosts(["LOCALHOST"]);
        assert!(config.host_allow_list().contains("localhost"));
    }
}
