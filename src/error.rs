//! Error types for wheelhouse operations.
//!
//! This module defines [`WheelhouseError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every variant is fatal to the composition run that raised it
//! - Directive errors carry the line of the offending block
//! - Use `anyhow::Error` (via `WheelhouseError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wheelhouse operations.
#[derive(Debug, Error)]
pub enum WheelhouseError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration or prompt file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// The configuration parsed but does not have the expected shape.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A key path walked into a value that is not a container.
    #[error("Cannot resolve '{path}': {message}")]
    StructuralMismatch { path: String, message: String },

    /// Begin and end directive markers do not pair up.
    #[error("Unbalanced {kind} blocks: {message}")]
    UnbalancedBlock { kind: String, message: String },

    /// A loop source is not a sequence of single-key entries.
    #[error("Invalid loop source '{path}' (line {line}): {message}")]
    InvalidLoopSource {
        path: String,
        line: usize,
        message: String,
    },

    /// A conditional operand could not be resolved or compared.
    #[error("Cannot evaluate operand '{operand}': {message}")]
    OperandResolutionError { operand: String, message: String },

    /// A conditional used an operator outside the supported set.
    #[error("Unknown operator '{token}' (line {line})")]
    UnknownOperator { token: String, line: usize },

    /// No template file exists for an object type.
    #[error("No template file found for object type '{object_type}' in {dir}")]
    MissingTemplate { object_type: String, dir: PathBuf },

    /// Expanded template text is not valid structured data.
    #[error("Expanded template {path} is not valid {format}: {message}")]
    TemplateParseError {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// The manifest builder rejected a definition.
    #[error("Failed to build manifest for {unit}: {message}")]
    BuildFailed { unit: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for wheelhouse operations.
pub type Result<T> = std::result::Result<T, WheelhouseError>;
