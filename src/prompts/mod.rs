//! Interactive prompt files.
//!
//! A package may ship an `interactive.*` file listing questions to ask
//! before composing:
//!
//! ```yaml
//! - prompt: "Image tag: "
//!   variable: tag            # fills ${var.tag|...} in the configuration
//! - prompt: "Replicas: "
//!   path: web.deployment.replicas   # overrides a configuration value
//!   default: 2
//! - prompt: "Region"
//!   variable: region
//!   type: select
//!   options: [eu-west-1, us-east-1]
//! ```
//!
//! Blank answers are skipped, so the configuration keeps its own default.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::config::{read_document, UserAnswers};
use crate::error::{Result, WheelhouseError};
use crate::ui::{Prompt, PromptOption, PromptResult, PromptType, UserInterface};

/// Kind of question to ask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    #[default]
    Input,
    Select,
    Confirm,
}

/// One entry of a prompt file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromptSpec {
    /// Question shown to the user.
    pub prompt: String,
    /// Substitution variable that receives the answer.
    #[serde(default)]
    pub variable: Option<String>,
    /// Dotted configuration path that receives the answer.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: PromptKind,
}

impl PromptSpec {
    /// Key used for mock responses and environment overrides.
    pub fn key(&self) -> &str {
        self.variable
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or(self.prompt.as_str())
    }

    fn default_text(&self) -> Option<String> {
        self.default.as_ref().and_then(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => serde_yaml::to_string(other)
                .ok()
                .map(|s| s.trim_end().to_string()),
        })
    }

    /// Build the UI prompt for this entry.
    pub fn to_prompt(&self) -> Prompt {
        let prompt_type = match self.kind {
            PromptKind::Input => PromptType::Input,
            PromptKind::Confirm => PromptType::Confirm,
            PromptKind::Select => PromptType::Select {
                options: self.options.iter().map(PromptOption::plain).collect(),
            },
        };

        Prompt {
            key: self.key().to_string(),
            question: self.prompt.trim_end().trim_end_matches(':').to_string(),
            prompt_type,
            default: self.default_text(),
        }
    }
}

/// Read a prompt file.
///
/// # Errors
///
/// Returns `ConfigParseError` if the file is not a sequence of prompt
/// entries.
pub fn load_prompt_file(path: &Path) -> Result<Vec<PromptSpec>> {
    let doc = read_document(path)?;
    if doc.is_null() {
        return Ok(Vec::new());
    }

    serde_yaml::from_value(doc).map_err(|e| WheelhouseError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Ask each prompt and collect the non-blank answers.
pub fn collect_answers(prompts: &[PromptSpec], ui: &mut dyn UserInterface) -> Result<UserAnswers> {
    let mut answers = UserAnswers::new();

    for spec in prompts {
        if spec.variable.is_none() && spec.path.is_none() {
            debug!(prompt = %spec.prompt, "prompt has no variable or path, skipping");
            continue;
        }

        let result = ui.prompt(&spec.to_prompt())?;
        if result.is_blank() {
            debug!(key = spec.key(), "blank answer, keeping configured default");
            continue;
        }

        if let Some(variable) = &spec.variable {
            answers.set_variable(variable.clone(), result.as_string());
        }
        if let Some(path) = &spec.path {
            answers.set_path(path.clone(), answer_value(&result));
        }
    }

    debug!(
        variables = answers.variables.len(),
        paths = answers.paths.len(),
        "collected answers"
    );
    Ok(answers)
}

/// A typed value for a path override: `3` becomes a number, `true` a bool.
fn answer_value(result: &PromptResult) -> Value {
    match result {
        PromptResult::Bool(b) => Value::Bool(*b),
        PromptResult::String(s) => {
            serde_yaml::from_str::<Value>(s.trim()).unwrap_or_else(|_| Value::String(s.clone()))
        }
    }
}
