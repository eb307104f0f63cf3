//! Answers collected from interactive prompts.

use std::collections::BTreeMap;

use serde_yaml::Value;

/// User answers, applied to a configuration in two ways.
///
/// `variables` feed `${var.NAME|DEFAULT}` text substitution before the
/// configuration is parsed. `paths` are dotted-path overrides applied to the
/// parsed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAnswers {
    pub variables: BTreeMap<String, String>,
    pub paths: BTreeMap<String, Value>,
}

impl UserAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer for a substitution variable.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, answer: impl Into<String>) {
        self.variables.insert(name.into(), answer.into());
    }

    pub fn set_path(&mut self, path: impl Into<String>, value: Value) {
        self.paths.insert(path.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.paths.is_empty()
    }

    /// Path overrides in key order.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, Value)> {
        self.paths.iter().map(|(k, v)| (k.as_str(), v.clone()))
    }
}
