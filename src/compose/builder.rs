//! Manifest builders.
//!
//! A builder turns one expanded template definition into an artifact that
//! can be written to disk. [`YamlManifestBuilder`] is the default: it
//! resolves references against the unit's configuration, nulls out
//! `<placeholder>` strings, drops empty values and serializes to YAML.

use serde_yaml::Value;

use crate::document::{resolve_placeholders, resolve_references_against, strip_empty};
use crate::error::{Result, WheelhouseError};

/// A built manifest ready to be written.
pub trait Artifact {
    /// Serialized file contents.
    fn to_text(&self) -> Result<String>;

    /// File extension without the dot.
    fn extension(&self) -> &str;
}

/// Turns a template definition into an [`Artifact`].
pub trait ManifestBuilder {
    fn build(&self, definition: &Value, config: &Value) -> Result<Box<dyn Artifact>>;
}

/// A normalized manifest serialized as YAML.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlManifest {
    document: Value,
}

impl YamlManifest {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }
}

impl Artifact for YamlManifest {
    fn to_text(&self) -> Result<String> {
        serde_yaml::to_string(&self.document).map_err(|e| WheelhouseError::Other(e.into()))
    }

    fn extension(&self) -> &str {
        "yaml"
    }
}

/// Default builder producing [`YamlManifest`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlManifestBuilder;

impl YamlManifestBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a definition without wrapping it.
    pub fn normalize(&self, definition: &Value, config: &Value) -> Result<Value> {
        let resolved = resolve_references_against(definition, config)?;
        let resolved = resolve_placeholders(&resolved);
        Ok(strip_empty(&resolved))
    }
}

impl ManifestBuilder for YamlManifestBuilder {
    fn build(&self, definition: &Value, config: &Value) -> Result<Box<dyn Artifact>> {
        let document = self.normalize(definition, config)?;
        Ok(Box::new(YamlManifest::new(document)))
    }
}
