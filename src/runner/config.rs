//! Binder configuration.

use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::runner::error::BinderError;
use crate::runner::options::{Options, SELECTOR_KEY};
use crate::runner::priority::PriorityPolicy;

/// Selector used to find candidate elements unless configured otherwise.
pub const DEFAULT_SELECTOR: &str = "[data-controller]";

/// Attribute naming an element's controller.
pub const DEFAULT_CONTROLLER_ATTRIBUTE: &str = "data-controller";

/// Attribute holding an element's numeric priority.
pub const DEFAULT_PRIORITY_ATTRIBUTE: &str = "data-priority";

/// What `run()` does when a constructor or hook fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the pass and return the error.
    #[default]
    Abort,
    /// Log the error, continue with the next element, report a count at the end.
    Isolate,
}

/// Immutable configuration of a binder.
#[derive(Debug, Clone, PartialEq)]
pub struct BinderConfig {
    pub selector: String,
    pub controller_attribute: String,
    pub priority_attribute: String,
    /// Extra base options handed to every controller.
    pub options: Options,
    pub priority: PriorityPolicy,
    pub failures: FailurePolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawConfig {
    selector: Option<String>,
    controller_attribute: Option<String>,
    priority_attribute: Option<String>,
    priority: Option<PriorityPolicy>,
    failures: Option<FailurePolicy>,
    options: Option<toml::Table>,
}

impl BinderConfig {
    pub fn new() -> Self {
        BinderConfig {
            selector: DEFAULT_SELECTOR.to_string(),
            controller_attribute: DEFAULT_CONTROLLER_ATTRIBUTE.to_string(),
            priority_attribute: DEFAULT_PRIORITY_ATTRIBUTE.to_string(),
            options: Options::new(),
            priority: PriorityPolicy::default(),
            failures: FailurePolicy::default(),
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_controller_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.controller_attribute = attribute.into();
        self
    }

    pub fn with_priority_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.priority_attribute = attribute.into();
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_priority_policy(mut self, policy: PriorityPolicy) -> Self {
        self.priority = policy;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failures = policy;
        self
    }

    /// Options every dispatch starts from: `{selector}` ⊕ configured options.
    pub fn base_options(&self) -> Options {
        let mut base = Options::new().with(SELECTOR_KEY, self.selector.as_str());
        base.extend_from(&self.options);
        base
    }

    /// Load configuration from a TOML file.
    ///
    /// Expected format (every key optional):
    /// ```toml
    /// selector = "[data-controller]"
    /// controller-attribute = "data-controller"
    /// priority-attribute = "data-priority"
    /// priority = "weak"        # or "absent-last"
    /// failures = "abort"       # or "isolate"
    ///
    /// [options]
    /// theme = "dark"
    /// ```
    pub fn load(path: &Path) -> Result<Self, BinderError> {
        let content = fs::read_to_string(path).map_err(|error| BinderError::Io {
            path: path.to_path_buf(),
            error,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, BinderError> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| BinderError::Config(e.to_string()))?;

        let defaults = BinderConfig::new();
        Ok(BinderConfig {
            selector: raw.selector.unwrap_or(defaults.selector),
            controller_attribute: raw.controller_attribute.unwrap_or(defaults.controller_attribute),
            priority_attribute: raw.priority_attribute.unwrap_or(defaults.priority_attribute),
            options: match raw.options {
                Some(table) => Options::try_from(table)?,
                None => defaults.options,
            },
            priority: raw.priority.unwrap_or(defaults.priority),
            failures: raw.failures.unwrap_or(defaults.failures),
        })
    }
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = BinderConfig::parse("").unwrap();
        assert_eq!(config, BinderConfig::new());
        assert_eq!(config.selector, "[data-controller]");
    }

    #[test]
    fn test_parse_full_config() {
        let config = BinderConfig::parse(
            r#"
            selector = ".widget"
            priority = "absent-last"
            failures = "isolate"

            [options]
            theme = "dark"
            "#,
        )
        .unwrap();
        assert_eq!(config.selector, ".widget");
        assert_eq!(config.priority, PriorityPolicy::AbsentLast);
        assert_eq!(config.failures, FailurePolicy::Isolate);
        assert_eq!(config.options.get_str("theme"), Some("dark"));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(matches!(
            BinderConfig::parse("selectr = 'x'"),
            Err(BinderError::Config(_))
        ));
    }

    #[test]
    fn test_base_options_start_with_selector() {
        let config = BinderConfig::new().with_options(Options::new().with("selector", "override"));
        assert_eq!(config.base_options().get_str("selector"), Some("override"));

        let config = BinderConfig::new().with_selector(".x");
        assert_eq!(config.base_options().get_str("selector"), Some(".x"));
    }
}
