//! `${var.NAME|DEFAULT}` substitution in raw configuration text.
//!
//! Runs on the text before parsing, so an answer can land anywhere: inside
//! a string, as a bare number, or as a whole value.
//!
//! ```yaml
//! replicas: ${var.replicas|1}
//! image: "nginx:${var.tag|latest}"
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::answers::UserAnswers;

static VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{var\.([A-Za-z0-9_.-]+)\|([^}]*)\}").unwrap());

/// Replace each variable with its answer, or its default when unanswered.
pub fn apply_answer_variables(text: &str, answers: &UserAnswers) -> String {
    VARIABLE
        .replace_all(text, |caps: &Captures<'_>| {
            answers
                .variable(&caps[1])
                .unwrap_or(&caps[2])
                .to_string()
        })
        .into_owned()
}

/// Names of all variables referenced in `text`, in order of appearance.
pub fn referenced_variables(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in VARIABLE.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
