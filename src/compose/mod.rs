//! Package composition: from a configuration and a template directory to
//! one manifest file per unit.
//!
//! - [`package`] locates the configuration, prompt file and templates
//! - [`template`] finds the template for an object type
//! - [`builder`] normalizes an expanded definition into an artifact
//! - [`orchestrator`] plans units and writes the results

pub mod builder;
pub mod orchestrator;
pub mod package;
pub mod template;

pub use builder::{Artifact, ManifestBuilder, YamlManifest, YamlManifestBuilder};
pub use orchestrator::{
    plan_units, ComposeOptions, ComposeReport, ComposedUnit, Composer, Unit, UnitId, NAME_KEY,
    OBJECTS_KEY, THIS_KEY,
};
pub use package::{PackageLayout, TEMPLATES_DIR};
pub use template::{TemplateFile, TemplateFormat, TemplateStore, TEMPLATE_FILES};
