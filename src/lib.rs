//! Wheelhouse - compose deployment manifests from template packages.
//!
//! A package holds a configuration file, an optional prompt file and one
//! template per object type. Templates carry `{% if %}` / `{% for %}`
//! directives in line comments; wheelhouse expands them against each
//! object's configuration, resolves `${...}` references and writes one
//! normalized manifest per unit.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`compose`] - Package layout, templates, builders and the composer
//! - [`config`] - Configuration loading, formats and answer substitution
//! - [`directives`] - Conditional and loop expansion of template text
//! - [`document`] - Dotted-path access and document normalization
//! - [`error`] - Error types and result aliases
//! - [`prompts`] - Interactive prompt files
//! - [`ui`] - Prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use wheelhouse::directives::expand;
//!
//! let config: serde_yaml::Value = serde_yaml::from_str("deployment: {replicas: 3}").unwrap();
//! let template = "// {% if cfg.deployment.replicas > 1 %}\n\"ha\": true,\n// {% end if %}";
//! assert_eq!(expand(template, &config).unwrap(), "\"ha\": true,\n");
//! ```
//!
//! For package composition on disk, see the integration tests.

pub mod cli;
pub mod compose;
pub mod config;
pub mod directives;
pub mod document;
pub mod error;
pub mod prompts;
pub mod ui;

pub use error::{Result, WheelhouseError};
