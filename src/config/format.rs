//! Document formats recognized by file extension.

use std::fmt;
use std::path::Path;

use serde_yaml::Value;

use super::jsonc::strip_comments;
use crate::error::{Result, WheelhouseError};

/// Serialization format of a configuration, prompt or template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    /// Plain JSON; falls back to JSONC when strict parsing fails.
    Json,
    Jsonc,
}

impl DocumentFormat {
    /// Pick a format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParseError` for unrecognized extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            Some("json") => Ok(DocumentFormat::Json),
            Some("jsonc") => Ok(DocumentFormat::Jsonc),
            other => Err(WheelhouseError::ConfigParseError {
                path: path.to_path_buf(),
                message: format!(
                    "unsupported file extension '{}', expected yaml, yml, json or jsonc",
                    other.unwrap_or("")
                ),
            }),
        }
    }

    /// Parse text in this format into a document.
    pub fn parse(self, text: &str) -> std::result::Result<Value, String> {
        match self {
            DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(text)
                .or_else(|_| serde_json::from_str(&strip_comments(text)))
                .map_err(|e| e.to_string()),
            DocumentFormat::Jsonc => {
                serde_json::from_str(&strip_comments(text)).map_err(|e| e.to_string())
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Json => "json",
            DocumentFormat::Jsonc => "jsonc",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentFormat::Yaml => "YAML",
            DocumentFormat::Json => "JSON",
            DocumentFormat::Jsonc => "JSONC",
        })
    }
}
