//! Template package layout.
//!
//! ```text
//! my-package/
//! ├── config.yaml          # first file named config*
//! ├── interactive.yaml     # optional, first file named interactive*
//! └── templates/
//!     ├── deployment/template.jsonc
//!     └── service/template.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::config::load_document;
use crate::error::{Result, WheelhouseError};
use crate::prompts::{collect_answers, load_prompt_file, PromptSpec};
use crate::ui::UserInterface;

use super::template::TemplateStore;

pub const TEMPLATES_DIR: &str = "templates";

/// Files found in a package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub root: PathBuf,
    pub config: PathBuf,
    pub interactive: Option<PathBuf>,
    pub templates: PathBuf,
}

impl PackageLayout {
    /// Inspect a package directory.
    ///
    /// `config_override` replaces the discovered configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the directory has no configuration file
    /// and no override is given.
    pub fn discover(root: &Path, config_override: Option<&Path>) -> Result<Self> {
        let mut files = list_files(root)?;
        files.sort();

        let named = |prefix: &str| {
            files
                .iter()
                .find(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(prefix))
                })
                .cloned()
        };

        let config = match config_override {
            Some(path) => path.to_path_buf(),
            None => named("config").ok_or_else(|| WheelhouseError::ConfigNotFound {
                path: root.join("config.yaml"),
            })?,
        };

        Ok(Self {
            root: root.to_path_buf(),
            config,
            interactive: named("interactive"),
            templates: root.join(TEMPLATES_DIR),
        })
    }

    /// Template lookup for this package.
    pub fn template_store(&self) -> TemplateStore {
        TemplateStore::new(&self.templates)
    }

    /// Prompts from the package's interactive file, if any.
    pub fn prompts(&self) -> Result<Vec<PromptSpec>> {
        match &self.interactive {
            Some(path) => load_prompt_file(path),
            None => Ok(Vec::new()),
        }
    }

    /// Ask the package prompts, then load the resolved configuration.
    pub fn load_config(
        &self,
        ui: &mut dyn UserInterface,
        overrides: &[(String, Value)],
    ) -> Result<Value> {
        let prompts = self.prompts()?;
        debug!(
            prompts = prompts.len(),
            config = %self.config.display(),
            "loading package configuration"
        );
        let answers = collect_answers(&prompts, ui)?;
        load_document(&self.config, &answers, overrides)
    }

    /// Package name: the directory's final component.
    pub fn name(&self) -> String {
        self.root
            .canonicalize()
            .ok()
            .as_deref()
            .unwrap_or(&self.root)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string())
    }
}

fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WheelhouseError::ConfigNotFound {
                path: root.to_path_buf(),
            }
        } else {
            WheelhouseError::Io(e)
        }
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
