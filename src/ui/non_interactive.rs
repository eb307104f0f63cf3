//! Non-interactive UI for CI/headless environments.
//!
//! Prompts are answered from `WHEELHOUSE_ANSWER_<KEY>` environment
//! variables, then from the prompt default. A prompt with neither gets a
//! blank answer, which the prompt collector treats as skipped.

use std::collections::HashMap;

use crate::error::Result;

use super::{
    parse_confirm, OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface,
};

/// Environment variable prefix for non-interactive answers.
pub const ANSWER_ENV_PREFIX: &str = "WHEELHOUSE_ANSWER_";

/// UI implementation for non-interactive mode.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI, reading answers from the environment.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(ANSWER_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }

    /// Environment variable consulted for a prompt key.
    pub fn env_key(key: &str) -> String {
        let normalized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", ANSWER_ENV_PREFIX, normalized)
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let answer = self
            .env_overrides
            .get(&Self::env_key(&prompt.key))
            .or(prompt.default.as_ref())
            .cloned()
            .unwrap_or_default();

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_confirm(&answer)),
            _ => PromptResult::String(answer),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("  {}", message);
        }
        Box::new(NoopSpinner { mode: self.mode })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints only its final status line.
struct NoopSpinner {
    mode: OutputMode,
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_prompt(key: &str, default: Option<&str>) -> Prompt {
        Prompt {
            key: key.to_string(),
            question: "Question?".to_string(),
            prompt_type: PromptType::Input,
            default: default.map(String::from),
        }
    }

    #[test]
    fn env_key_is_normalized() {
        assert_eq!(
            NonInteractiveUI::env_key("image.tag"),
            "WHEELHOUSE_ANSWER_IMAGE_TAG"
        );
        assert_eq!(
            NonInteractiveUI::env_key("replicas"),
            "WHEELHOUSE_ANSWER_REPLICAS"
        );
    }

    #[test]
    fn override_wins_over_default() {
        let mut overrides = HashMap::new();
        overrides.insert("WHEELHOUSE_ANSWER_TAG".to_string(), "1.25".to_string());
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, overrides);

        let result = ui.prompt(&input_prompt("tag", Some("latest"))).unwrap();
        assert_eq!(result, PromptResult::String("1.25".into()));
    }

    #[test]
    fn default_used_without_override() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, HashMap::new());
        let result = ui.prompt(&input_prompt("tag", Some("latest"))).unwrap();
        assert_eq!(result, PromptResult::String("latest".into()));
    }

    #[test]
    fn no_override_or_default_is_blank() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, HashMap::new());
        let result = ui.prompt(&input_prompt("tag", None)).unwrap();
        assert!(result.is_blank());
    }

    #[test]
    fn confirm_parses_answer() {
        let mut overrides = HashMap::new();
        overrides.insert("WHEELHOUSE_ANSWER_TLS".to_string(), "yes".to_string());
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Silent, overrides);

        let prompt = Prompt {
            key: "tls".into(),
            question: "Enable TLS?".into(),
            prompt_type: PromptType::Confirm,
            default: None,
        };
        assert_eq!(ui.prompt(&prompt).unwrap(), PromptResult::Bool(true));
    }

    #[test]
    fn is_never_interactive() {
        let ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        assert!(!ui.is_interactive());
    }
}
