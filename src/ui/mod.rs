//! User interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use wheelhouse::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("web-app");
//! ui.success("Composed 3 manifests");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, SpinnerStatus};
pub use non_interactive::{NonInteractiveUI, ANSWER_ENV_PREFIX};
pub use output::OutputMode;
pub use prompts::prompt_user;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, is_ci, TerminalUI};
pub use theme::{should_use_colors, WheelhouseTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Change the output mode.
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a prompt and get user input.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);
}

/// A prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Key for lookups (mock responses, environment overrides).
    pub key: String,
    /// The question to display.
    pub question: String,
    pub prompt_type: PromptType,
    /// Default value if user just presses enter.
    pub default: Option<String>,
}

/// The type of prompt.
#[derive(Debug, Clone)]
pub enum PromptType {
    /// Yes/no confirmation.
    Confirm,
    /// Free-form text input.
    Input,
    /// Select one from a list of options.
    Select { options: Vec<PromptOption> },
}

/// An option in a select prompt.
#[derive(Debug, Clone)]
pub struct PromptOption {
    /// Display label.
    pub label: String,
    /// Value returned when selected.
    pub value: String,
}

impl PromptOption {
    /// An option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Result of a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptResult {
    /// Boolean result from confirm.
    Bool(bool),
    /// String result from input or select.
    String(String),
}

impl PromptResult {
    /// Get as string, suitable for substitution.
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Get as bool if this is a Bool result.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// True for a string answer that is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::String(s) if s.trim().is_empty())
    }
}

/// Interpret a textual answer as a confirmation.
pub(crate) fn parse_confirm(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_result_as_string() {
        assert_eq!(PromptResult::Bool(true).as_string(), "true");
        assert_eq!(PromptResult::String("web".into()).as_string(), "web");
    }

    #[test]
    fn prompt_result_as_bool() {
        assert_eq!(PromptResult::Bool(false).as_bool(), Some(false));
        assert_eq!(PromptResult::String("true".into()).as_bool(), None);
    }

    #[test]
    fn blank_answers() {
        assert!(PromptResult::String("   ".into()).is_blank());
        assert!(!PromptResult::String("x".into()).is_blank());
        assert!(!PromptResult::Bool(false).is_blank());
    }

    #[test]
    fn plain_option_uses_value_as_label() {
        let opt = PromptOption::plain("eu-west-1");
        assert_eq!(opt.label, "eu-west-1");
        assert_eq!(opt.value, "eu-west-1");
    }

    #[test]
    fn parse_confirm_accepts_common_spellings() {
        assert!(parse_confirm("yes"));
        assert!(parse_confirm(" Y "));
        assert!(parse_confirm("true"));
        assert!(!parse_confirm("no"));
        assert!(!parse_confirm(""));
    }
}
