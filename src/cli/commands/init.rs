//! Init command implementation.
//!
//! The `wheelhouse init` command writes the embedded starter package.

use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};

use crate::cli::args::InitArgs;
use crate::compose::PackageLayout;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Starter package embedded at compile time.
static STARTER: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/starter");

/// The init command implementation.
pub struct InitCommand {
    args: InitArgs,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(args: InitArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &InitArgs {
        &self.args
    }

    /// Check if the target already holds a package configuration.
    fn package_exists(&self) -> bool {
        PackageLayout::discover(&self.args.dir, None).is_ok()
    }
}

/// Write every file of an embedded directory below `dest`.
pub fn write_starter(dir: &Dir<'_>, dest: &Path, written: &mut Vec<PathBuf>) -> Result<()> {
    for file in dir.files() {
        let target = dest.join(file.path());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, file.contents())?;
        written.push(target);
    }
    for sub in dir.dirs() {
        write_starter(sub, dest, written)?;
    }
    Ok(())
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.package_exists() && !self.args.force {
            ui.warning("Package configuration already exists. Use --force to overwrite.");
            return Ok(CommandResult::failure(1));
        }

        ui.show_header("New package");

        let mut written = Vec::new();
        write_starter(&STARTER, &self.args.dir, &mut written)?;
        written.sort();

        if ui.output_mode().shows_details() {
            for path in &written {
                ui.message(&format!("  {}", path.display()));
            }
        }

        ui.success(&format!(
            "Created starter package in {}",
            self.args.dir.display()
        ));
        ui.message("\nNext steps:");
        ui.message("  1. Describe your objects in config.yaml");
        ui.message("  2. Add a template per object type under templates/");
        ui.message(&format!(
            "  3. Run `wheelhouse compose {}`",
            self.args.dir.display()
        ));

        Ok(CommandResult::success())
    }
}
