//! Loading configuration documents from disk.
//!
//! Loading a package configuration runs these steps:
//!
//! 1. Read the raw text
//! 2. Substitute `${var.NAME|DEFAULT}` answers
//! 3. Parse according to the file extension
//! 4. Overlay answers that target a dotted path, then CLI overrides
//! 5. Resolve `${root.path}` references

use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use super::answers::UserAnswers;
use super::format::DocumentFormat;
use super::variables::apply_answer_variables;
use crate::document::{overlay, resolve_references};
use crate::error::{Result, WheelhouseError};

/// Read a file, mapping a missing file to `ConfigNotFound`.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WheelhouseError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            WheelhouseError::Io(e)
        }
    })
}

/// Parse text as the format implied by `path`.
pub fn parse_document(text: &str, path: &Path) -> Result<Value> {
    let format = DocumentFormat::from_path(path)?;
    format
        .parse(text)
        .map_err(|message| WheelhouseError::ConfigParseError {
            path: path.to_path_buf(),
            message,
        })
}

/// Read and parse a document without any substitution.
pub fn read_document(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    parse_document(&text, path)
}

/// Load a package configuration.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if it cannot be parsed.
pub fn load_document(
    path: &Path,
    answers: &UserAnswers,
    overrides: &[(String, Value)],
) -> Result<Value> {
    let raw = read_text(path)?;
    let text = apply_answer_variables(&raw, answers);
    let doc = parse_document(&text, path)?;

    let doc = overlay(doc, answers.overrides())?;
    let doc = overlay(doc, overrides.iter().map(|(k, v)| (k.as_str(), v.clone())))?;

    debug!(
        path = %path.display(),
        overrides = answers.paths.len() + overrides.len(),
        "loaded configuration"
    );

    resolve_references(&doc)
}
