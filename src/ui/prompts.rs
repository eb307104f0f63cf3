//! Interactive prompts.

use console::Term;
use dialoguer::{Confirm, Input, Select};

use crate::error::{Result, WheelhouseError};

use super::{parse_confirm, Prompt, PromptOption, PromptResult, PromptType};

fn map_dialoguer_err(e: dialoguer::Error) -> WheelhouseError {
    WheelhouseError::Io(e.into())
}

/// Prompt the user on a terminal.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Confirm => prompt_confirm(prompt, term),
        PromptType::Input => prompt_input(prompt, term),
        PromptType::Select { options } => prompt_select(prompt, options, term),
    }
}

fn prompt_confirm(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let default = prompt.default.as_deref().map(parse_confirm).unwrap_or(false);

    let result = Confirm::new()
        .with_prompt(&prompt.question)
        .default(default)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    Ok(PromptResult::Bool(result))
}

fn prompt_input(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    // Empty input is a valid answer: it means "skip this prompt".
    let input = Input::<String>::new()
        .with_prompt(&prompt.question)
        .allow_empty(true);

    let result: String = match &prompt.default {
        Some(default) => input
            .default(default.clone())
            .interact_on(term)
            .map_err(map_dialoguer_err)?,
        None => input.interact_on(term).map_err(map_dialoguer_err)?,
    };

    Ok(PromptResult::String(result))
}

fn prompt_select(prompt: &Prompt, options: &[PromptOption], term: &Term) -> Result<PromptResult> {
    let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();

    let default_idx = prompt
        .default
        .as_ref()
        .and_then(|d| options.iter().position(|o| o.value == *d))
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt(&prompt.question)
        .items(&labels)
        .default(default_idx)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    options
        .get(selection)
        .map(|o| PromptResult::String(o.value.clone()))
        .ok_or_else(|| WheelhouseError::InvalidConfig {
            message: format!("Prompt '{}' has no options to select", prompt.key),
        })
}
