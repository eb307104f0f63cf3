//! Template lookup per object type.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DocumentFormat;
use crate::error::{Result, WheelhouseError};

/// Candidate file names, in lookup order.
pub const TEMPLATE_FILES: [&str; 4] = [
    "template.yaml",
    "template.yml",
    "template.json",
    "template.jsonc",
];

/// Format used to parse expanded template text.
pub type TemplateFormat = DocumentFormat;

/// A template read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub path: PathBuf,
    pub format: TemplateFormat,
    pub contents: String,
}

/// Templates stored as `<dir>/<object_type>/template.<ext>`.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locate the template file for an object type.
    ///
    /// # Errors
    ///
    /// Returns `MissingTemplate` if none of [`TEMPLATE_FILES`] exists.
    pub fn find(&self, object_type: &str) -> Result<PathBuf> {
        let type_dir = self.dir.join(object_type);

        TEMPLATE_FILES
            .iter()
            .map(|name| type_dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| WheelhouseError::MissingTemplate {
                object_type: object_type.to_string(),
                dir: type_dir,
            })
    }

    /// Find and read the template for an object type.
    pub fn load(&self, object_type: &str) -> Result<TemplateFile> {
        let path = self.find(object_type)?;
        let format = TemplateFormat::from_path(&path)?;
        let contents = fs::read_to_string(&path)?;

        Ok(TemplateFile {
            path,
            format,
            contents,
        })
    }

    /// Object types that have a template, sorted by name.
    pub fn object_types(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut types = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.find(&name).is_ok() {
                types.push(name);
            }
        }
        types.sort();
        Ok(types)
    }
}
