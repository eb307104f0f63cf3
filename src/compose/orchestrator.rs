//! Composition of a whole configuration into manifest files.
//!
//! The configuration lists objects, each owning one entry per object type:
//!
//! ```yaml
//! objects:
//!   - web:
//!       deployment: { replicas: 2 }
//!       service: { port: 80 }
//!       configmap:              # a list produces one unit per element
//!         - settings: { data: { LOG: info } }
//!         - features: { data: { BETA: "on" } }
//! ```
//!
//! Every (object, type) pair, or (object, type, element) for list-valued
//! types, becomes a [`Unit`]. A unit's document is a copy of the object's
//! mapping; list elements are exposed under `__this__` with their name in
//! `__this__.__name__`. Types whose name starts with `__` are skipped.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::directives;
use crate::document::kind_name;
use crate::error::{Result, WheelhouseError};

use super::builder::{Artifact, ManifestBuilder};
use super::template::{TemplateFile, TemplateStore};

pub const OBJECTS_KEY: &str = "objects";
pub const THIS_KEY: &str = "__this__";
pub const NAME_KEY: &str = "__name__";

/// Where composed files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    pub out_dir: PathBuf,
    /// Directory for the expanded definition of each unit, as JSON.
    pub debug_dir: Option<PathBuf>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            debug_dir: None,
        }
    }
}

/// Identifies one composition unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitId {
    pub object: String,
    pub object_type: String,
    /// Position within a list-valued type.
    pub element: Option<usize>,
}

impl UnitId {
    /// Base file name: `<object>-<type>` or `<object>-<type>-<index>`.
    pub fn file_stem(&self) -> String {
        match self.element {
            Some(i) => format!("{}-{}-{}", self.object, self.object_type, i),
            None => format!("{}-{}", self.object, self.object_type),
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.object, self.object_type)?;
        if let Some(i) = self.element {
            write!(f, "[{}]", i)?;
        }
        Ok(())
    }
}

/// A unit and the document its template is evaluated against.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: UnitId,
    pub document: Value,
}

/// Split a configuration into composition units, in configuration order.
///
/// # Errors
///
/// Returns `InvalidConfig` if `objects` is missing or malformed, and
/// `StructuralMismatch` for a list element that is not a single-key mapping.
pub fn plan_units(config: &Value) -> Result<Vec<Unit>> {
    let objects = config
        .get(OBJECTS_KEY)
        .and_then(Value::as_sequence)
        .ok_or_else(|| WheelhouseError::InvalidConfig {
            message: format!("expected '{}' to be a list of objects", OBJECTS_KEY),
        })?;

    let mut units = Vec::new();
    for (index, entry) in objects.iter().enumerate() {
        let (object, types) = single_entry(entry).ok_or_else(|| WheelhouseError::InvalidConfig {
            message: format!(
                "{}[{}] must map one object name to its types, found {}",
                OBJECTS_KEY,
                index,
                kind_name(entry)
            ),
        })?;
        let types = types.as_mapping().ok_or_else(|| WheelhouseError::InvalidConfig {
            message: format!(
                "object '{}' must be a mapping of types, found {}",
                object,
                kind_name(types)
            ),
        })?;

        for (key, type_config) in types {
            let Some(object_type) = key.as_str() else {
                continue;
            };
            if object_type.starts_with("__") {
                debug!(object, object_type, "skipping reserved type");
                continue;
            }
            plan_type(&mut units, object, object_type, types, type_config)?;
        }
    }

    Ok(units)
}

fn plan_type(
    units: &mut Vec<Unit>,
    object: &str,
    object_type: &str,
    types: &Mapping,
    type_config: &Value,
) -> Result<()> {
    let Value::Sequence(elements) = type_config else {
        units.push(Unit {
            id: UnitId {
                object: object.to_string(),
                object_type: object_type.to_string(),
                element: None,
            },
            document: Value::Mapping(types.clone()),
        });
        return Ok(());
    };

    for (i, element) in elements.iter().enumerate() {
        let (name, attributes) =
            single_entry(element).ok_or_else(|| WheelhouseError::StructuralMismatch {
                path: format!("{}.{}[{}]", object, object_type, i),
                message: format!(
                    "list elements must be single-key mappings, found {}",
                    kind_name(element)
                ),
            })?;

        let mut this = match attributes {
            Value::Null => Mapping::new(),
            Value::Mapping(map) => map.clone(),
            other => {
                return Err(WheelhouseError::StructuralMismatch {
                    path: format!("{}.{}.{}", object, object_type, name),
                    message: format!(
                        "element attributes must be a mapping, found {}",
                        kind_name(other)
                    ),
                })
            }
        };
        this.insert(Value::from(NAME_KEY), Value::from(name));

        let mut document = types.clone();
        document.insert(Value::from(THIS_KEY), Value::Mapping(this));

        units.push(Unit {
            id: UnitId {
                object: object.to_string(),
                object_type: object_type.to_string(),
                element: Some(i),
            },
            document: Value::Mapping(document),
        });
    }
    Ok(())
}

/// The key and value of a mapping with exactly one string key.
fn single_entry(value: &Value) -> Option<(&str, &Value)> {
    let map = value.as_mapping()?;
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    Some((key.as_str()?, value))
}

/// One file written by a composition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedUnit {
    pub id: UnitId,
    pub path: PathBuf,
    pub debug_path: Option<PathBuf>,
}

/// Outcome of [`Composer::compose`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeReport {
    pub units: Vec<ComposedUnit>,
}

impl ComposeReport {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.units.iter().map(|u| u.path.as_path())
    }
}

/// Expands templates and writes one manifest per unit.
pub struct Composer<'a> {
    store: TemplateStore,
    builder: &'a dyn ManifestBuilder,
    options: ComposeOptions,
}

impl<'a> Composer<'a> {
    pub fn new(
        store: TemplateStore,
        builder: &'a dyn ManifestBuilder,
        options: ComposeOptions,
    ) -> Self {
        Self {
            store,
            builder,
            options,
        }
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Compose every unit of a configuration.
    ///
    /// All templates are loaded before the output directory is emptied, so
    /// a missing template leaves it untouched. Stops at the first failing
    /// unit; files already written for earlier units are left in place.
    pub fn compose(&self, config: &Value) -> Result<ComposeReport> {
        let units = plan_units(config)?;
        info!(units = units.len(), out = %self.options.out_dir.display(), "composing");

        let mut templates: HashMap<String, TemplateFile> = HashMap::new();
        for unit in &units {
            if !templates.contains_key(&unit.id.object_type) {
                let template = self.store.load(&unit.id.object_type)?;
                templates.insert(unit.id.object_type.clone(), template);
            }
        }

        self.check_out_dir()?;
        reset_dir(&self.options.out_dir)?;
        if let Some(debug_dir) = &self.options.debug_dir {
            fs::create_dir_all(debug_dir)?;
        }

        let mut report = ComposeReport::default();
        for unit in &units {
            let template = &templates[&unit.id.object_type];
            let composed = self.write_unit(unit, template)?;
            debug!(unit = %composed.id, path = %composed.path.display(), "wrote manifest");
            report.units.push(composed);
        }

        info!(written = report.len(), "composition finished");
        Ok(report)
    }

    /// Expand and parse a unit's template without writing anything.
    pub fn expand_unit(&self, unit: &Unit, template: &TemplateFile) -> Result<Value> {
        let expanded = directives::expand(&template.contents, &unit.document)?;
        template
            .format
            .parse(&expanded)
            .map_err(|message| WheelhouseError::TemplateParseError {
                path: template.path.clone(),
                format: template.format.to_string(),
                message,
            })
    }

    /// Render one unit to manifest text.
    pub fn render_unit(&self, unit: &Unit) -> Result<String> {
        let template = self.store.load(&unit.id.object_type)?;
        let definition = self.expand_unit(unit, &template)?;
        self.build(unit, &definition)?.to_text()
    }

    /// The output directory must not hold the templates or the package
    /// they belong to.
    fn check_out_dir(&self) -> Result<()> {
        let out = &self.options.out_dir;
        let Ok(out) = out.canonicalize() else {
            return Ok(());
        };
        let templates = self.store.dir();
        let protected = [Some(templates), templates.parent()];

        for dir in protected.into_iter().flatten() {
            let Ok(dir) = dir.canonicalize() else {
                continue;
            };
            if dir.starts_with(&out) {
                return Err(WheelhouseError::InvalidConfig {
                    message: format!(
                        "output directory '{}' would overwrite package files in '{}'",
                        self.options.out_dir.display(),
                        dir.display()
                    ),
                });
            }
        }
        Ok(())
    }

    fn build(&self, unit: &Unit, definition: &Value) -> Result<Box<dyn Artifact>> {
        self.builder
            .build(definition, &unit.document)
            .map_err(|e| WheelhouseError::BuildFailed {
                unit: unit.id.to_string(),
                message: e.to_string(),
            })
    }

    fn write_unit(&self, unit: &Unit, template: &TemplateFile) -> Result<ComposedUnit> {
        let stem = unit.id.file_stem();
        let definition = self.expand_unit(unit, template)?;

        let debug_path = match &self.options.debug_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.json", stem));
                let json = serde_json::to_string_pretty(&definition)
                    .map_err(|e| WheelhouseError::Other(e.into()))?;
                fs::write(&path, json)?;
                Some(path)
            }
            None => None,
        };

        let artifact = self.build(unit, &definition)?;
        let path = self
            .options
            .out_dir
            .join(format!("{}.{}", stem, artifact.extension()));
        fs::write(&path, artifact.to_text()?)?;

        Ok(ComposedUnit {
            id: unit.id.clone(),
            path,
            debug_path,
        })
    }
}

/// Remove and recreate a directory.
fn reset_dir(dir: &Path) -> Result<()> {
    if dir.file_name().is_none() {
        return Err(WheelhouseError::InvalidConfig {
            message: format!("refusing to clear output directory '{}'", dir.display()),
        });
    }
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
