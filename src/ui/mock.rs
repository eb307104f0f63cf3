//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined prompt responses.
//!
//! # Example
//!
//! ```
//! use wheelhouse::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("tag", "1.25");
//!
//! ui.message("Composing web-app");
//! ui.success("Done!");
//!
//! assert!(ui.has_message("Composing"));
//! assert!(ui.successes().contains(&"Done!".to_string()));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;

use super::{
    parse_confirm, OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface,
};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    spinners: Vec<String>,
    spinner_results: Arc<Mutex<Vec<(SpinnerStatus, String)>>>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            ..Default::default()
        }
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set a response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Messages of every spinner that was started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// How each spinner finished, in finish order.
    pub fn spinner_results(&self) -> Vec<(SpinnerStatus, String)> {
        self.spinner_results
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Keys of the prompts that were shown, in order.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        // Configured response, then the prompt default, then blank.
        let response = self
            .prompt_responses
            .get(&prompt.key)
            .or(prompt.default.as_ref())
            .cloned()
            .unwrap_or_default();

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_confirm(&response)),
            _ => PromptResult::String(response),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner {
            results: Arc::clone(&self.spinner_results),
            messages: vec![message.to_string()],
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    Success,
    Error,
}

/// Mock spinner that reports its finish back to the owning [`MockUI`].
#[derive(Debug)]
pub struct MockSpinner {
    results: Arc<Mutex<Vec<(SpinnerStatus, String)>>>,
    messages: Vec<String>,
}

impl MockSpinner {
    /// All messages set on this spinner, starting with the initial one.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    fn record(&self, status: SpinnerStatus, msg: &str) {
        if let Ok(mut results) = self.results.lock() {
            results.push((status, msg.to_string()));
        }
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.record(SpinnerStatus::Success, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.record(SpinnerStatus::Error, msg);
    }
}
