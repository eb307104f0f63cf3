//! Configuration loading for template packages.
//!
//! This module handles:
//! - Format detection by extension in [`format`]
//! - JSONC comment stripping in [`jsonc`]
//! - `${var.NAME|DEFAULT}` answer substitution in [`variables`]
//! - Reading, overlaying and resolving documents in [`loader`]
//!
//! # Example
//!
//! ```
//! use wheelhouse::config::{load_document, UserAnswers};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yaml");
//! fs::write(&path, "app:\n  replicas: ${var.replicas|1}").unwrap();
//!
//! let doc = load_document(&path, &UserAnswers::new(), &[]).unwrap();
//! assert_eq!(doc["app"]["replicas"], 1);
//! ```

pub mod answers;
pub mod format;
pub mod jsonc;
pub mod loader;
pub mod variables;

pub use answers::UserAnswers;
pub use format::DocumentFormat;
pub use jsonc::strip_comments;
pub use loader::{load_document, parse_document, read_document, read_text};
pub use variables::{apply_answer_variables, referenced_variables};

/// Alias used where the format describes a configuration file.
pub type ConfigFormat = DocumentFormat;

#[cfg(test)]
mod tests {
    #[test]
    fn serde_yaml_parses_nested_objects() {
        let yaml = r#"
          objects:
            - web:
                deployment:
                  replicas: 2
                service:
                  port: 80
        "#;
        let parsed: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed["objects"][0]["web"]["deployment"]["replicas"], 2);
        assert_eq!(parsed["objects"][0]["web"]["service"]["port"], 80);
    }
}
